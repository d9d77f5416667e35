// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nomad CLI scheduler adapter

use super::{render_job, EvalId, SchedulerAdapter, SchedulerError};
use crate::subprocess::{combined_output, run_with_timeout};
use async_trait::async_trait;
use keel_core::{AllocationStatus, ClientStatus, JobDefinition, NodeInfo};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Scheduler adapter that shells out to the `nomad` CLI.
///
/// Job files are rendered to JSON in `job_dir` and submitted with `nomad job run -json`.
#[derive(Clone, Debug)]
pub struct NomadCliAdapter {
    bin: String,
    job_dir: PathBuf,
    timeout: Duration,
}

impl NomadCliAdapter {
    pub fn new(bin: impl Into<String>, job_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            job_dir: job_dir.into(),
            timeout: crate::env::scheduler_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, args: &[&str], description: &str) -> Result<String, SchedulerError> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        let output = run_with_timeout(cmd, self.timeout, description)
            .await
            .map_err(SchedulerError::CommandFailed)?;
        if !output.status.success() {
            let text = combined_output(&output);
            if text.contains("not found") || text.contains("No job(s) with prefix") {
                return Err(SchedulerError::NotFound(text));
            }
            return Err(SchedulerError::CommandFailed(format!(
                "{}: {}",
                description, text
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SchedulerAdapter for NomadCliAdapter {
    async fn submit_job(&self, job: &JobDefinition) -> Result<EvalId, SchedulerError> {
        let body = serde_json::to_vec_pretty(&render_job(job))
            .map_err(|e| SchedulerError::InvalidResponse(e.to_string()))?;
        tokio::fs::create_dir_all(&self.job_dir)
            .await
            .map_err(|e| SchedulerError::CommandFailed(e.to_string()))?;
        let path = self.job_dir.join(format!("{}.json", job.id()));
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| SchedulerError::CommandFailed(e.to_string()))?;

        let path_str = path.to_string_lossy();
        let stdout = self
            .run(
                &["job", "run", "-detach", "-json", &path_str],
                "nomad job run",
            )
            .await?;
        parse_eval_id(&stdout).ok_or_else(|| {
            SchedulerError::InvalidResponse(format!("no evaluation id in: {}", stdout.trim()))
        })
    }

    async fn stop_job(&self, job_id: &str, purge: bool) -> Result<(), SchedulerError> {
        let mut args = vec!["job", "stop", "-detach"];
        if purge {
            args.push("-purge");
        }
        args.push(job_id);
        self.run(&args, "nomad job stop").await.map(|_| ())
    }

    async fn job_allocations(&self, job_id: &str) -> Result<Vec<AllocationStatus>, SchedulerError> {
        match self
            .run(&["job", "allocs", "-json", job_id], "nomad job allocs")
            .await
        {
            Ok(stdout) => parse_allocations(&stdout),
            Err(SchedulerError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn node_info(&self, node_id: &str) -> Result<NodeInfo, SchedulerError> {
        let stdout = self
            .run(&["node", "status", "-json", node_id], "nomad node status")
            .await?;
        parse_node(&stdout)
    }

    async fn scale_job(
        &self,
        job_id: &str,
        group: &str,
        count: u32,
    ) -> Result<(), SchedulerError> {
        let count = count.to_string();
        self.run(
            &["job", "scale", "-detach", job_id, group, &count],
            "nomad job scale",
        )
        .await
        .map(|_| ())
    }
}

/// Extract the evaluation id from `nomad job run -detach` output.
pub(crate) fn parse_eval_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (label, value) = line.split_once(':')?;
        (label.trim() == "Evaluation ID")
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AllocStub {
    #[serde(rename = "ID")]
    id: String,
    task_group: String,
    client_status: ClientStatus,
    #[serde(rename = "NodeID", default)]
    node_id: String,
    #[serde(default)]
    node_name: String,
    #[serde(default)]
    deployment_status: Option<AllocDeploymentStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AllocDeploymentStatus {
    #[serde(default)]
    healthy: Option<bool>,
}

pub(crate) fn parse_allocations(stdout: &str) -> Result<Vec<AllocationStatus>, SchedulerError> {
    let stubs: Vec<AllocStub> = serde_json::from_str(stdout)
        .map_err(|e| SchedulerError::InvalidResponse(format!("allocations: {}", e)))?;
    Ok(stubs
        .into_iter()
        .map(|stub| AllocationStatus {
            id: stub.id,
            task_group: stub.task_group,
            client_status: stub.client_status,
            healthy: stub.deployment_status.and_then(|d| d.healthy),
            node_id: stub.node_id,
            node_name: stub.node_name,
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NodeStatus {
    #[serde(rename = "HTTPAddr", default)]
    http_addr: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    meta: HashMap<String, String>,
}

pub(crate) fn parse_node(stdout: &str) -> Result<NodeInfo, SchedulerError> {
    let node: NodeStatus = serde_json::from_str(stdout)
        .map_err(|e| SchedulerError::InvalidResponse(format!("node: {}", e)))?;
    let address = node
        .attributes
        .get("unique.network.ip-address")
        .cloned()
        .or_else(|| {
            node.http_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
        })
        .filter(|a| !a.is_empty())
        .ok_or_else(|| SchedulerError::InvalidResponse("node has no address".to_string()))?;
    Ok(NodeInfo {
        address,
        provider: node.meta.get("provider").cloned().unwrap_or_default(),
        region: node.meta.get("region").cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "nomad_tests.rs"]
mod tests;
