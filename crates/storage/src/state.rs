// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::event::StoreEvent;
use indexmap::IndexMap;
use keel_core::{Deployment, DeploymentStatus, SagaEvent, SagaId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Deployments and saga events rebuilt by applying store events in order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedState {
    /// Keyed by deployment id, in insertion order
    #[serde(default)]
    pub deployments: IndexMap<String, Deployment>,
    /// Keyed by event id, in append order
    #[serde(default)]
    pub saga_events: IndexMap<String, SagaEvent>,
}

impl MaterializedState {
    /// Apply one event. Must stay idempotent for snapshot + replay overlap.
    pub fn apply_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::DeploymentCreated { deployment } => {
                self.deployments
                    .entry(deployment.id.as_str().to_string())
                    .or_insert_with(|| deployment.clone());
            }

            StoreEvent::DeploymentStatus {
                id,
                status,
                finished_at_ms,
            } => {
                let Some(deployment) = self.deployments.get_mut(id.as_str()) else {
                    warn!(id = %id, "status change for unknown deployment");
                    return;
                };
                deployment.status = *status;
                if finished_at_ms.is_some() {
                    deployment.finished_at_ms = *finished_at_ms;
                }
            }

            StoreEvent::DeploymentResolved {
                id,
                commit_sha,
                image_tag,
            } => {
                let Some(deployment) = self.deployments.get_mut(id.as_str()) else {
                    warn!(id = %id, "resolution for unknown deployment");
                    return;
                };
                deployment.commit_sha = commit_sha.clone();
                deployment.image_tag = image_tag.clone();
            }

            StoreEvent::SagaAppended { event } => {
                self.saga_events
                    .entry(event.id.as_str().to_string())
                    .or_insert_with(|| event.clone());
            }
        }
    }

    pub fn deployment(&self, id: &str) -> Option<&Deployment> {
        self.deployments.get(id)
    }

    /// Deployments of one app, newest first.
    pub fn deployments_for(&self, app: &str) -> Vec<&Deployment> {
        let mut found: Vec<&Deployment> = self
            .deployments
            .values()
            .filter(|d| d.app == app)
            .collect();
        // Stable sort keeps later insertions ahead on equal timestamps
        found.reverse();
        found.sort_by(|a, b| b.started_at_ms.cmp(&a.started_at_ms));
        found
    }

    /// Deployments not yet in a terminal status.
    pub fn in_flight(&self) -> impl Iterator<Item = &Deployment> {
        self.deployments.values().filter(|d| !d.is_terminal())
    }

    /// Most recent deployed deployment of `app`, skipping `exclude`.
    pub fn last_deployed(&self, app: &str, exclude: &str) -> Option<&Deployment> {
        self.deployments_for(app).into_iter().find(|d| {
            d.status == DeploymentStatus::Deployed && d.id != exclude && !d.image_tag.is_empty()
        })
    }

    /// Events of one saga in append order.
    pub fn saga(&self, saga_id: &SagaId) -> Vec<&SagaEvent> {
        self.saga_events
            .values()
            .filter(|e| &e.saga_id == saga_id)
            .collect()
    }

    /// The most recent `limit` events matching `keep`, newest first.
    pub fn recent(&self, limit: usize, keep: impl Fn(&SagaEvent) -> bool) -> Vec<&SagaEvent> {
        self.saga_events
            .values()
            .rev()
            .filter(|e| keep(*e))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
