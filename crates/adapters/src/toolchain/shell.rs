// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Toolchain backed by git, docker, sh, and pg_dump

use super::{ImageBuild, ToolError, ToolchainAdapter};
use crate::subprocess::{
    combined_output, run_with_timeout, DUMP_TIMEOUT, GIT_QUERY_TIMEOUT, GIT_TIMEOUT,
    SHELL_COMMAND_TIMEOUT,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Shell-based toolchain
#[derive(Clone, Debug)]
pub struct ShellToolchain {
    image_timeout: Duration,
}

impl Default for ShellToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellToolchain {
    pub fn new() -> Self {
        Self {
            image_timeout: crate::env::image_timeout(),
        }
    }
}

/// Run a command, mapping non-zero exit to [`ToolError::Failed`].
async fn run_checked(cmd: Command, timeout: Duration, tool: &str) -> Result<String, ToolError> {
    let output = run_with_timeout(cmd, timeout, tool)
        .await
        .map_err(ToolError::Exec)?;
    let text = combined_output(&output);
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            output: text,
        });
    }
    Ok(text)
}

async fn head_sha(dir: &Path) -> Result<String, ToolError> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(dir).args(["rev-parse", "HEAD"]);
    let output = run_with_timeout(cmd, GIT_QUERY_TIMEOUT, "git rev-parse")
        .await
        .map_err(ToolError::Exec)?;
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: "git rev-parse".to_string(),
            output: combined_output(&output),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[async_trait]
impl ToolchainAdapter for ShellToolchain {
    async fn fetch_source(
        &self,
        repo: &str,
        git_ref: &str,
        dest: &Path,
    ) -> Result<String, ToolError> {
        let mut clone = Command::new("git");
        clone.args(["clone", "--quiet", repo]).arg(dest);
        run_checked(clone, GIT_TIMEOUT, "git clone").await?;

        let mut checkout = Command::new("git");
        checkout
            .arg("-C")
            .arg(dest)
            .args(["checkout", "--quiet", "--detach", git_ref]);
        run_checked(checkout, GIT_TIMEOUT, "git checkout").await?;

        head_sha(dest).await
    }

    async fn local_source(&self, src: &Path, dest: &Path) -> Result<Option<String>, ToolError> {
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| ToolError::Exec(format!("create {}: {}", dest.display(), e)))?;
        let mut copy = Command::new("cp");
        copy.arg("-a").arg(src.join(".")).arg(dest);
        run_checked(copy, GIT_TIMEOUT, "cp").await?;
        Ok(head_sha(dest).await.ok())
    }

    async fn build_number(&self, dir: &Path) -> u64 {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(dir).args(["rev-list", "--count", "HEAD"]);
        match run_with_timeout(cmd, GIT_QUERY_TIMEOUT, "git rev-list").await {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .trim()
                .parse()
                .unwrap_or(0),
            _ => 0,
        }
    }

    async fn build_image(&self, build: &ImageBuild) -> Result<(), ToolError> {
        let mut cmd = Command::new("docker");
        cmd.args(["build", "--tag", &build.tag, "--file"])
            .arg(&build.dockerfile);
        for (key, value) in &build.build_args {
            cmd.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        cmd.arg(&build.context);
        run_checked(cmd, self.image_timeout, "docker build").await?;
        Ok(())
    }

    async fn push_image(&self, tag: &str) -> Result<(), ToolError> {
        let mut cmd = Command::new("docker");
        cmd.args(["push", tag]);
        run_checked(cmd, self.image_timeout, "docker push").await?;
        Ok(())
    }

    async fn run_command(
        &self,
        dir: &Path,
        command: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<String, ToolError> {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]).current_dir(dir).envs(env);
        run_checked(cmd, SHELL_COMMAND_TIMEOUT, command).await
    }

    async fn dump_database(&self, database: &str, dest: &Path) -> Result<(), ToolError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::Exec(format!("create {}: {}", parent.display(), e)))?;
        }
        let mut cmd = Command::new("pg_dump");
        cmd.args(["--format=custom", "--file"])
            .arg(dest)
            .arg(database);
        run_checked(cmd, DUMP_TIMEOUT, "pg_dump").await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
