// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge routing adapters

mod file;

pub use file::FileEdgeRouter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEdgeRouter, RouterCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from edge routing operations
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("route table error: {0}")]
    Table(String),
    #[error("reload failed: {0}")]
    ReloadFailed(String),
}

/// Adapter for the externally visible routing layer
#[async_trait]
pub trait EdgeRouterAdapter: Clone + Send + Sync + 'static {
    /// Point `host` at `url`. Returns whether anything changed.
    async fn add_route(&self, host: &str, url: &str) -> Result<bool, RouterError>;

    /// Remove the route for `host`. Returns whether anything changed.
    async fn remove_route(&self, host: &str) -> Result<bool, RouterError>;

    /// Make pending route changes live
    async fn apply(&self) -> Result<(), RouterError>;
}
