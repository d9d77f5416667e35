// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed store shared by the engine and the daemon.

use crate::event::StoreEvent;
use crate::traits::{DeploymentStore, SagaStore, StoreError};
use crate::{MaterializedState, Snapshot, Wal};
use keel_core::{Deployment, DeploymentId, DeploymentStatus, SagaEvent, SagaId};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Durable store of deployments and saga events.
///
/// Every write is appended to the WAL and fsynced before it is applied, so
/// each write commits independently. Cloning shares the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    state: MaterializedState,
    /// `None` for in-memory stores
    wal: Option<Wal>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Load the snapshot (if any) and replay the WAL after it.
    pub fn open(wal_path: &Path, snapshot_path: &Path) -> Result<Self, StoreError> {
        let (snapshot_seq, mut state) = match Snapshot::load(snapshot_path)? {
            Some(snapshot) => (snapshot.seq, snapshot.state),
            None => (0, MaterializedState::default()),
        };

        let wal = Wal::open(wal_path)?;
        let entries = wal.entries_after(snapshot_seq)?;
        for entry in &entries {
            state.apply_event(&entry.event);
        }

        info!(
            snapshot_seq,
            replayed = entries.len(),
            deployments = state.deployments.len(),
            saga_events = state.saga_events.len(),
            "store opened",
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state,
                wal: Some(wal),
                snapshot_path: Some(snapshot_path.to_owned()),
            })),
        })
    }

    /// A store without files, for tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state: MaterializedState::default(),
                wal: None,
                snapshot_path: None,
            })),
        }
    }

    /// Save a snapshot and drop the WAL entries it covers.
    ///
    /// Returns the snapshot sequence number (0 for in-memory stores).
    pub fn checkpoint(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let StoreInner {
            state,
            wal,
            snapshot_path,
        } = &mut *inner;
        let (Some(wal), Some(snapshot_path)) = (wal.as_mut(), snapshot_path.as_ref()) else {
            return Ok(0);
        };

        wal.flush()?;
        let seq = wal.write_seq();
        Snapshot::write(snapshot_path, seq, state)?;
        wal.truncate_before(seq + 1)?;
        debug!(seq, "checkpoint saved");
        Ok(seq)
    }

    /// Copy of the current state.
    pub fn state(&self) -> MaterializedState {
        self.inner.lock().state.clone()
    }

    fn commit(&self, event: StoreEvent) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if let Some(wal) = inner.wal.as_mut() {
            wal.append(&event)?;
            wal.flush()?;
        }
        inner.state.apply_event(&event);
        Ok(())
    }

    fn require_deployment(&self, id: &DeploymentId) -> Result<(), StoreError> {
        if self.inner.lock().state.deployment(id.as_str()).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl SagaStore for Store {
    fn append(&self, event: &SagaEvent) -> Result<(), StoreError> {
        self.commit(StoreEvent::SagaAppended {
            event: event.clone(),
        })
    }

    fn list_by_saga(&self, saga_id: &SagaId) -> Result<Vec<SagaEvent>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.state.saga(saga_id).into_iter().cloned().collect())
    }

    fn list_by_app(&self, app: &str, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .state
            .recent(limit, |e| e.app == app)
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .state
            .recent(limit, |_| true)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl DeploymentStore for Store {
    fn insert(&self, deployment: &Deployment) -> Result<(), StoreError> {
        if self
            .inner
            .lock()
            .state
            .deployment(deployment.id.as_str())
            .is_some()
        {
            return Err(StoreError::Duplicate(deployment.id.to_string()));
        }
        self.commit(StoreEvent::DeploymentCreated {
            deployment: deployment.clone(),
        })
    }

    fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
        finished_at_ms: Option<u64>,
    ) -> Result<(), StoreError> {
        self.require_deployment(id)?;
        self.commit(StoreEvent::DeploymentStatus {
            id: id.clone(),
            status,
            finished_at_ms,
        })
    }

    fn resolve(
        &self,
        id: &DeploymentId,
        commit_sha: &str,
        image_tag: &str,
    ) -> Result<(), StoreError> {
        self.require_deployment(id)?;
        self.commit(StoreEvent::DeploymentResolved {
            id: id.clone(),
            commit_sha: commit_sha.to_string(),
            image_tag: image_tag.to_string(),
        })
    }

    fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, StoreError> {
        Ok(self.inner.lock().state.deployment(id.as_str()).cloned())
    }

    fn list_deployments(&self, app: &str, limit: usize) -> Result<Vec<Deployment>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .state
            .deployments_for(app)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    fn last_successful_deployment(
        &self,
        app: &str,
        exclude: &DeploymentId,
    ) -> Result<Option<Deployment>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.state.last_deployed(app, exclude.as_str()).cloned())
    }

    fn recover_in_flight_deployments(&self, now_ms: u64) -> Result<usize, StoreError> {
        let stale: Vec<DeploymentId> = {
            let inner = self.inner.lock();
            inner.state.in_flight().map(|d| d.id.clone()).collect()
        };
        for id in &stale {
            info!(deployment = %id, "marking in-flight deployment failed");
            self.commit(StoreEvent::DeploymentStatus {
                id: id.clone(),
                status: DeploymentStatus::Failed,
                finished_at_ms: Some(now_ms),
            })?;
        }
        Ok(stale.len())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
