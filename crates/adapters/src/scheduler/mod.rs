// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster scheduler adapters

mod nomad;
mod render;

pub use nomad::NomadCliAdapter;
pub use render::render_job;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeScheduler, SchedulerCall};

use async_trait::async_trait;
use keel_core::{AllocationStatus, JobDefinition, NodeInfo};
use thiserror::Error;

/// Evaluation id returned by a job submission
pub type EvalId = String;

/// Errors from scheduler operations
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler command failed: {0}")]
    CommandFailed(String),
    #[error("unexpected scheduler response: {0}")]
    InvalidResponse(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Adapter for the cluster workload scheduler
#[async_trait]
pub trait SchedulerAdapter: Clone + Send + Sync + 'static {
    /// Register or update a job. Submissions are declarative upserts.
    async fn submit_job(&self, job: &JobDefinition) -> Result<EvalId, SchedulerError>;

    /// Stop a job, optionally purging it from the scheduler's state
    async fn stop_job(&self, job_id: &str, purge: bool) -> Result<(), SchedulerError>;

    /// Current allocations of a job (empty when the job is unknown)
    async fn job_allocations(&self, job_id: &str) -> Result<Vec<AllocationStatus>, SchedulerError>;

    /// Placement details of a node
    async fn node_info(&self, node_id: &str) -> Result<NodeInfo, SchedulerError>;

    /// Set the instance count of one task group
    async fn scale_job(&self, job_id: &str, group: &str, count: u32)
        -> Result<(), SchedulerError>;
}
