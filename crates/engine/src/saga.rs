// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Saga recorder: appends timestamped events for one operation.

use keel_core::{action, Clock, IdGen, SagaCategory, SagaEvent, SagaEventId, SagaId, SagaSource};
use keel_storage::{SagaStore, StoreError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Handle for appending events to one saga.
pub struct Saga<St, C> {
    id: SagaId,
    app: String,
    source: SagaSource,
    category: SagaCategory,
    store: St,
    clock: C,
    ids: Arc<dyn IdGen>,
}

impl<St: SagaStore, C: Clock> Saga<St, C> {
    /// Start a saga with a freshly allocated id.
    pub fn new(
        app: impl Into<String>,
        source: SagaSource,
        category: SagaCategory,
        store: St,
        clock: C,
        ids: Arc<dyn IdGen>,
    ) -> Self {
        Self {
            id: SagaId::new(ids.next()),
            app: app.into(),
            source,
            category,
            store,
            clock,
            ids,
        }
    }

    pub fn id(&self) -> &SagaId {
        &self.id
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn category(&self) -> SagaCategory {
        self.category
    }

    /// Append one event, timestamped now.
    pub fn log(
        &self,
        action: &str,
        message: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Result<SagaEvent, StoreError> {
        let event = SagaEvent {
            id: SagaEventId::new(self.ids.next()),
            saga_id: self.id.clone(),
            timestamp_ms: self.clock.epoch_ms(),
            source: self.source,
            app: self.app.clone(),
            category: self.category,
            action: action.to_string(),
            message: message.into(),
            metadata,
        };
        self.store.append(&event)?;
        Ok(event)
    }

    pub fn step_start(&self, step: &str) -> Result<SagaEvent, StoreError> {
        self.log(
            action::STEP_START,
            format!("{} started", step),
            step_meta(step, []),
        )
    }

    pub fn step_complete(&self, step: &str, duration_ms: u64) -> Result<SagaEvent, StoreError> {
        self.log(
            action::STEP_COMPLETE,
            format!("{} complete", step),
            step_meta(step, [("duration_ms", duration_ms.to_string())]),
        )
    }

    pub fn step_failed(&self, step: &str, err: &dyn fmt::Display) -> Result<SagaEvent, StoreError> {
        let error = err.to_string();
        self.log(
            action::STEP_FAILED,
            format!("{} failed: {}", step, error),
            step_meta(step, [("error", error)]),
        )
    }
}

fn step_meta<const N: usize>(step: &str, extra: [(&str, String); N]) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::from([("step".to_string(), step.to_string())]);
    meta.extend(extra.into_iter().map(|(k, v)| (k.to_string(), v)));
    meta
}

#[cfg(test)]
#[path = "saga_tests.rs"]
mod tests;
