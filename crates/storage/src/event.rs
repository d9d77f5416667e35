// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store mutations recorded in the WAL.
//!
//! Every write to the store is one [`StoreEvent`]. Events are durable before
//! they are applied, so replaying the WAL over a snapshot rebuilds the state.

use keel_core::{Deployment, DeploymentId, DeploymentStatus, SagaEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    #[serde(rename = "deployment:created")]
    DeploymentCreated { deployment: Deployment },

    #[serde(rename = "deployment:status")]
    DeploymentStatus {
        id: DeploymentId,
        status: DeploymentStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finished_at_ms: Option<u64>,
    },

    /// Resolved commit and image tag recorded on success
    #[serde(rename = "deployment:resolved")]
    DeploymentResolved {
        id: DeploymentId,
        commit_sha: String,
        image_tag: String,
    },

    #[serde(rename = "saga:event")]
    SagaAppended { event: SagaEvent },
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::DeploymentCreated { .. } => "deployment:created",
            StoreEvent::DeploymentStatus { .. } => "deployment:status",
            StoreEvent::DeploymentResolved { .. } => "deployment:resolved",
            StoreEvent::SagaAppended { .. } => "saga:event",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
