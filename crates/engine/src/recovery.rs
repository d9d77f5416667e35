// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery sweep.
//!
//! Pipelines are not resumable: any deployment still in a non-terminal state
//! when the process starts was interrupted and is marked failed.

use crate::Engine;
use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SecretsAdapter, ToolchainAdapter,
};
use keel_core::Clock;
use keel_storage::{DeploymentStore, SagaStore, StoreError};
use tracing::info;

/// Mark every in-flight deployment failed. Returns how many were marked.
pub fn recover_in_flight<D: DeploymentStore + ?Sized>(
    store: &D,
    clock: &impl Clock,
) -> Result<usize, StoreError> {
    let recovered = store.recover_in_flight_deployments(clock.epoch_ms())?;
    if recovered > 0 {
        info!(recovered, "marked interrupted deployments failed");
    }
    Ok(recovered)
}

impl<S, K, R, T, P, St, C> Engine<S, K, R, T, P, St, C>
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    St: SagaStore + DeploymentStore + Clone + 'static,
    C: Clock,
{
    /// Run the recovery sweep against this engine's store.
    ///
    /// Call once at startup, before any pipeline is launched.
    pub fn recover_in_flight(&self) -> Result<usize, StoreError> {
        recover_in_flight(&self.inner.deps.store, &self.inner.clock)
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
