// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run pipeline state and the step catalogue.

use keel_core::{
    AllocationStatus, DeploymentId, DeploymentStatus, SagaCategory, SagaId, ShortId,
};
use keel_spec::AppSpec;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Length of the commit prefix used in image tags and dump names
pub const SHA_PREFIX_LEN: usize = 12;

/// One step of a deploy or rollback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Clone,
    Build,
    Test,
    Snapshot,
    Migrate,
    Submit,
    Healthy,
    Forge,
    Cleanup,
}

pub const DEPLOY_STEPS: [Step; 9] = [
    Step::Clone,
    Step::Build,
    Step::Test,
    Step::Snapshot,
    Step::Migrate,
    Step::Submit,
    Step::Healthy,
    Step::Forge,
    Step::Cleanup,
];

pub const ROLLBACK_STEPS: [Step; 2] = [Step::Submit, Step::Healthy];

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Clone => "clone",
            Step::Build => "build",
            Step::Test => "test",
            Step::Snapshot => "snapshot",
            Step::Migrate => "migrate",
            Step::Submit => "submit",
            Step::Healthy => "healthy",
            Step::Forge => "forge",
            Step::Cleanup => "cleanup",
        }
    }

    /// Deployment status entered when this step begins, if it changes.
    pub fn entry_status(self) -> Option<DeploymentStatus> {
        match self {
            Step::Clone | Step::Build => Some(DeploymentStatus::Building),
            Step::Test => Some(DeploymentStatus::Testing),
            Step::Snapshot | Step::Migrate => Some(DeploymentStatus::Migrating),
            Step::Submit | Step::Healthy => Some(DeploymentStatus::Submitting),
            Step::Forge | Step::Cleanup => None,
        }
    }

    /// Deployment status reached when this step succeeds, if it changes.
    pub fn exit_status(self) -> Option<DeploymentStatus> {
        match self {
            Step::Healthy => Some(DeploymentStatus::Healthy),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State owned by one pipeline run, dropped when the run ends.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub spec: AppSpec,
    pub category: SagaCategory,
    pub deployment_id: DeploymentId,
    pub saga_id: SagaId,
    /// Ref requested by the caller (empty for rollbacks)
    pub git_ref: String,
    pub workdir: PathBuf,
    /// Resolved by `clone`, or taken from the rollback target
    pub commit_sha: String,
    /// Resolved by `build`, or taken from the rollback target
    pub image_tag: String,
    /// Spec env merged with secrets; resolved on first use
    pub env: Option<BTreeMap<String, String>>,
    /// Healthy allocations from the last convergence wait
    pub healthy: Vec<AllocationStatus>,
    pub status: DeploymentStatus,
}

impl PipelineContext {
    pub fn new(
        spec: AppSpec,
        category: SagaCategory,
        deployment_id: DeploymentId,
        saga_id: SagaId,
        git_ref: impl Into<String>,
        workdir: PathBuf,
    ) -> Self {
        Self {
            spec,
            category,
            deployment_id,
            saga_id,
            git_ref: git_ref.into(),
            workdir,
            commit_sha: String::new(),
            image_tag: String::new(),
            env: None,
            healthy: Vec::new(),
            status: DeploymentStatus::Queued,
        }
    }

    pub fn app(&self) -> &str {
        &self.spec.name
    }

    pub fn short_sha(&self) -> &str {
        self.commit_sha.short(SHA_PREFIX_LEN)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
