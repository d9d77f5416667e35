// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    AllocationStatus, ClientStatus, Deployment, DeploymentId, DeploymentStatus, SagaCategory,
    SagaEvent, SagaEventId, SagaId, SagaSource,
};
use std::collections::BTreeMap;

// ── Record factories ────────────────────────────────────────────────────────

/// A deployment in the given status, started at `started_at_ms`.
pub fn deployment(id: &str, app: &str, status: DeploymentStatus, started_at_ms: u64) -> Deployment {
    let mut d = Deployment::queued(
        DeploymentId::new(id),
        app,
        "0123456789abcdef0123",
        SagaId::new(format!("saga-{}", id)),
        started_at_ms,
    );
    d.status = status;
    if status.is_terminal() {
        d.finished_at_ms = Some(started_at_ms + 1_000);
    }
    if status == DeploymentStatus::Deployed {
        d.image_tag = format!("{}:0123456789ab", app);
    }
    d
}

pub fn saga_event(id: &str, saga_id: &str, app: &str, action: &str, timestamp_ms: u64) -> SagaEvent {
    SagaEvent {
        id: SagaEventId::new(id),
        saga_id: SagaId::new(saga_id),
        timestamp_ms,
        source: SagaSource::Api,
        app: app.to_string(),
        category: SagaCategory::Deploy,
        action: action.to_string(),
        message: String::new(),
        metadata: BTreeMap::new(),
    }
}

// ── Allocation factories ────────────────────────────────────────────────────

pub fn alloc(id: &str, status: ClientStatus, healthy: Option<bool>) -> AllocationStatus {
    AllocationStatus {
        id: id.to_string(),
        task_group: "web".to_string(),
        client_status: status,
        healthy,
        node_id: format!("node-{}", id),
        node_name: format!("worker-{}", id),
    }
}

pub fn healthy_alloc(id: &str) -> AllocationStatus {
    alloc(id, ClientStatus::Running, Some(true))
}

pub fn pending_alloc(id: &str) -> AllocationStatus {
    alloc(id, ClientStatus::Pending, None)
}
