// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the pipeline engine

use keel_adapters::{RouterError, SchedulerError, SecretsError, ToolError};
use keel_storage::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Why a pipeline step (or an engine operation) failed
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A fetch, build, test, dump, or migration tool exited non-zero
    #[error("{0}")]
    ExternalTool(String),
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("{app} not healthy after {}s", timeout.as_secs())]
    ConvergenceTimeout { app: String, timeout: Duration },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ToolError> for PipelineError {
    fn from(e: ToolError) -> Self {
        PipelineError::ExternalTool(e.to_string())
    }
}

impl From<SecretsError> for PipelineError {
    fn from(e: SecretsError) -> Self {
        PipelineError::ExternalTool(e.to_string())
    }
}

impl From<RouterError> for PipelineError {
    fn from(e: RouterError) -> Self {
        PipelineError::ExternalTool(e.to_string())
    }
}
