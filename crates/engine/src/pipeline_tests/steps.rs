// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Individual step behavior

use super::*;
use keel_adapters::ToolCall;

#[tokio::test(start_paused = true)]
async fn fetch_failure_falls_back_to_local_copy() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.toolchain.fail("fetch_source", "network unreachable");
    ctx.toolchain
        .set_local_commit(Some("cccccccccccccccccccccccccccccccccccccccc"));
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    assert_eq!(
        &ctx.toolchain.call_kinds()[..2],
        &["fetch_source", "local_source"]
    );
    let d = ctx.deployment(&run.deployment_id);
    assert_eq!(d.image_tag, "blog:cccccccccccc");

    let events = ctx.saga(&run.saga_id);
    let fallback = events.iter().find(|e| e.action == "clone.fallback").unwrap();
    assert!(fallback.message.contains("network unreachable"));
}

#[tokio::test(start_paused = true)]
async fn local_copy_without_history_uses_ref_as_commit() {
    let ctx = setup();
    ctx.healthy_cluster("worker");
    let run = ctx
        .engine
        .deploy(ctx.spec(WORKER_SPEC), "release", SagaSource::Api)
        .unwrap();
    let deployment_id = run.deployment_id.clone();
    run.wait().await;

    assert_eq!(ctx.deployment(&deployment_id).commit_sha, "release");
}

#[tokio::test(start_paused = true)]
async fn source_path_is_resolved_against_spec_root() {
    let ctx = setup();
    ctx.healthy_cluster("worker");
    let app_dir = ctx.source_dir().join("app");
    std::fs::create_dir_all(&app_dir).unwrap();
    let spec = ctx.spec(&format!("{}\n[source]\npath = \"app\"\n", WORKER_SPEC));
    ctx.deploy(spec).await;

    match &ctx.toolchain.calls()[0] {
        ToolCall::LocalSource { src, dest } => {
            assert_eq!(src, &app_dir);
            assert!(dest.starts_with(&ctx.engine.config().workspace_root));
        }
        other => panic!("expected local copy, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_ref_uses_source_branch() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let spec = ctx.spec(&BLOG_SPEC.replace(
        "repo = \"git@example.com:blog.git\"",
        "repo = \"git@example.com:blog.git\"\nbranch = \"trunk\"",
    ));
    ctx.deploy(spec).await;

    match &ctx.toolchain.calls()[0] {
        ToolCall::FetchSource { git_ref, .. } => assert_eq!(git_ref, "trunk"),
        other => panic!("expected fetch, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn snapshot_dumps_to_timestamped_backup() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let dump = ctx
        .toolchain
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ToolCall::DumpDatabase { database, dest } => Some((database, dest)),
            _ => None,
        })
        .unwrap();
    assert_eq!(dump.0, "blog_db");
    let expected = ctx
        .engine
        .config()
        .backup_dir
        .join("blog_db_0123456789ab_20260101T000000Z");
    assert_eq!(dump.1, expected);
    assert!(ctx.engine.config().backup_dir.is_dir());
}

#[tokio::test(start_paused = true)]
async fn snapshot_name_follows_clock() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.clock.advance(Duration::from_secs(90 * 60));
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let dest = ctx
        .toolchain
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ToolCall::DumpDatabase { dest, .. } => Some(dest),
            _ => None,
        })
        .unwrap();
    assert!(dest.ends_with("blog_db_0123456789ab_20260101T013000Z"));
}

#[tokio::test(start_paused = true)]
async fn function_processes_get_task_groups() {
    let ctx = setup();
    ctx.healthy_cluster("fn-app");
    let spec = ctx.spec(
        r#"
name = "fn-app"

[process.handler]
run = "./handler"
function = { timeout = "30s" }
"#,
    );
    let (_, status) = ctx.deploy(spec).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    assert!(ctx.scheduler.job("fn-app").is_some());
}

#[tokio::test(start_paused = true)]
async fn cron_only_app_skips_service_job_and_health_wait() {
    let ctx = setup();
    let spec = ctx.spec(
        r#"
name = "reports"

[process.nightly]
schedule = "0 2 * * *"
run = "./report"
"#,
    );
    let (_, status) = ctx.deploy(spec).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    let ids: Vec<String> = ctx
        .scheduler
        .submitted()
        .iter()
        .map(|j| j.id().to_string())
        .collect();
    assert_eq!(ids, vec!["reports-nightly".to_string()]);
    assert!(ctx
        .scheduler
        .calls()
        .iter()
        .all(|c| !matches!(c, keel_adapters::SchedulerCall::Allocations { .. })));
}
