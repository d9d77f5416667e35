// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=keel", "-c", "user.email=keel@example.com"])
        .args(args)
        .output()
        .unwrap();
    assert!(status.status.success(), "git {:?} failed", args);
}

/// A repository with `commits` commits, each touching `app.txt`.
fn repo_with_commits(commits: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "--quiet"]);
    for i in 0..commits {
        std::fs::write(tmp.path().join("app.txt"), format!("v{}", i)).unwrap();
        git(tmp.path(), &["add", "app.txt"]);
        git(tmp.path(), &["commit", "--quiet", "-m", &format!("commit {}", i)]);
    }
    tmp
}

#[tokio::test]
async fn run_command_returns_output() {
    let tmp = TempDir::new().unwrap();
    let env = BTreeMap::from([("GREETING".to_string(), "hi".to_string())]);
    let out = ShellToolchain::new()
        .run_command(tmp.path(), "echo $GREETING; pwd", &env)
        .await
        .unwrap();
    assert!(out.starts_with("hi\n"), "got: {}", out);
}

#[tokio::test]
async fn run_command_failure_carries_output() {
    let tmp = TempDir::new().unwrap();
    let err = ShellToolchain::new()
        .run_command(tmp.path(), "echo 'tests failed: 3'; exit 2", &BTreeMap::new())
        .await
        .unwrap_err();
    match err {
        ToolError::Failed { output, .. } => assert_eq!(output, "tests failed: 3"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_git_directory_has_build_number_zero() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(ShellToolchain::new().build_number(tmp.path()).await, 0);
}

#[tokio::test]
async fn local_source_copies_plain_directory() {
    let src = TempDir::new().unwrap();
    std::fs::write(src.path().join("Dockerfile"), "FROM scratch").unwrap();
    let dest = TempDir::new().unwrap();
    let work = dest.path().join("work");

    let sha = ShellToolchain::new()
        .local_source(src.path(), &work)
        .await
        .unwrap();
    assert_eq!(sha, None);
    assert!(work.join("Dockerfile").exists());
}

#[tokio::test]
async fn fetch_source_resolves_commit_and_build_number() {
    let repo = repo_with_commits(3);
    let dest = TempDir::new().unwrap();
    let work = dest.path().join("clone");
    let toolchain = ShellToolchain::new();

    let sha = toolchain
        .fetch_source(&repo.path().to_string_lossy(), "HEAD~1", &work)
        .await
        .unwrap();
    assert_eq!(sha.len(), 40);
    assert_eq!(std::fs::read_to_string(work.join("app.txt")).unwrap(), "v1");
    assert_eq!(toolchain.build_number(&work).await, 2);
}

#[tokio::test]
async fn fetch_unknown_ref_fails() {
    let repo = repo_with_commits(1);
    let dest = TempDir::new().unwrap();
    let err = ShellToolchain::new()
        .fetch_source(&repo.path().to_string_lossy(), "no-such-ref", &dest.path().join("c"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("git checkout"), "got: {}", err);
}
