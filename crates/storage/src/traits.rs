// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read/write shapes the engine needs from persistence.

use crate::{SnapshotError, WalError};
use keel_core::{Deployment, DeploymentId, DeploymentStatus, SagaEvent, SagaId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("deployment not found: {0}")]
    NotFound(String),
    #[error("deployment already exists: {0}")]
    Duplicate(String),
}

/// Append-only saga event log.
pub trait SagaStore: Send + Sync {
    fn append(&self, event: &SagaEvent) -> Result<(), StoreError>;

    /// All events of one saga, oldest first.
    fn list_by_saga(&self, saga_id: &SagaId) -> Result<Vec<SagaEvent>, StoreError>;

    /// The most recent `limit` events of one app, newest first.
    fn list_by_app(&self, app: &str, limit: usize) -> Result<Vec<SagaEvent>, StoreError>;

    /// The most recent `limit` events across all apps, newest first.
    fn list_recent(&self, limit: usize) -> Result<Vec<SagaEvent>, StoreError>;
}

/// Permanent deployment history.
pub trait DeploymentStore: Send + Sync {
    fn insert(&self, deployment: &Deployment) -> Result<(), StoreError>;

    /// `finished_at_ms` is recorded only when given.
    fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
        finished_at_ms: Option<u64>,
    ) -> Result<(), StoreError>;

    /// Record the resolved commit and image tag.
    fn resolve(&self, id: &DeploymentId, commit_sha: &str, image_tag: &str)
        -> Result<(), StoreError>;

    fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, StoreError>;

    /// Deployments of one app, newest first.
    fn list_deployments(&self, app: &str, limit: usize) -> Result<Vec<Deployment>, StoreError>;

    /// Newest `deployed` deployment of `app` other than `exclude`.
    fn last_successful_deployment(
        &self,
        app: &str,
        exclude: &DeploymentId,
    ) -> Result<Option<Deployment>, StoreError>;

    /// Force every non-terminal deployment to `failed`; returns how many changed.
    fn recover_in_flight_deployments(&self, now_ms: u64) -> Result<usize, StoreError>;
}
