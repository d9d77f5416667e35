// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment record and status state machine.

use crate::saga::SagaId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id! {
    /// Unique identifier for one deployment (one deploy or rollback run).
    pub struct DeploymentId;
}

/// Lifecycle status of a deployment.
///
/// `queued → building → testing → migrating → submitting → healthy → deployed`,
/// with `failed` reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Queued,
    Building,
    Testing,
    Migrating,
    Submitting,
    Healthy,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    /// Terminal statuses are never left once entered.
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Deployed | DeploymentStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentStatus::Queued => "queued",
            DeploymentStatus::Building => "building",
            DeploymentStatus::Testing => "testing",
            DeploymentStatus::Migrating => "migrating",
            DeploymentStatus::Submitting => "submitting",
            DeploymentStatus::Healthy => "healthy",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DeploymentStatus::Queued),
            "building" => Ok(DeploymentStatus::Building),
            "testing" => Ok(DeploymentStatus::Testing),
            "migrating" => Ok(DeploymentStatus::Migrating),
            "submitting" => Ok(DeploymentStatus::Submitting),
            "healthy" => Ok(DeploymentStatus::Healthy),
            "deployed" => Ok(DeploymentStatus::Deployed),
            "failed" => Ok(DeploymentStatus::Failed),
            other => Err(format!("unknown deployment status: {}", other)),
        }
    }
}

/// Permanent history record for one deploy or rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub app: String,
    /// Requested ref at creation; replaced with the resolved commit hash on success.
    pub commit_sha: String,
    /// Empty until the pipeline completes.
    #[serde(default)]
    pub image_tag: String,
    pub saga_id: SagaId,
    pub status: DeploymentStatus,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
}

impl Deployment {
    /// A freshly queued deployment.
    pub fn queued(
        id: DeploymentId,
        app: impl Into<String>,
        commit_sha: impl Into<String>,
        saga_id: SagaId,
        started_at_ms: u64,
    ) -> Self {
        Self {
            id,
            app: app.into(),
            commit_sha: commit_sha.into(),
            image_tag: String::new(),
            saga_id,
            status: DeploymentStatus::Queued,
            started_at_ms,
            finished_at_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
