// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Saga event log types.
//!
//! A saga is one logical operation (a deploy or a rollback). Every step of
//! the operation appends [`SagaEvent`]s under the same [`SagaId`]; the log is
//! append-only and is the audit trail for the whole system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

crate::define_id! {
    /// Groups all events of one operation.
    pub struct SagaId;
}

crate::define_id! {
    /// Identifier of a single saga event.
    pub struct SagaEventId;
}

/// Well-known saga actions. Progress entries may use any other string.
pub mod action {
    pub const STEP_START: &str = "step.start";
    pub const STEP_COMPLETE: &str = "step.complete";
    pub const STEP_FAILED: &str = "step.failed";
    pub const DEPLOY_START: &str = "deploy.start";
    pub const DEPLOY_COMPLETE: &str = "deploy.complete";
    pub const DEPLOY_FAILED: &str = "deploy.failed";
}

/// Who triggered the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SagaSource {
    Api,
    Webhook,
    Pipeline,
}

impl fmt::Display for SagaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaSource::Api => write!(f, "api"),
            SagaSource::Webhook => write!(f, "webhook"),
            SagaSource::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// Kind of operation a saga records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SagaCategory {
    Deploy,
    Rollback,
}

impl fmt::Display for SagaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaCategory::Deploy => write!(f, "deploy"),
            SagaCategory::Rollback => write!(f, "rollback"),
        }
    }
}

/// One append-only entry in a saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaEvent {
    pub id: SagaEventId,
    pub saga_id: SagaId,
    pub timestamp_ms: u64,
    pub source: SagaSource,
    pub app: String,
    pub category: SagaCategory,
    pub action: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl SagaEvent {
    /// Step name recorded in the metadata of step events.
    pub fn step(&self) -> Option<&str> {
        self.metadata.get("step").map(String::as_str)
    }

    pub fn is_action(&self, action: &str) -> bool {
        self.action == action
    }
}

#[cfg(test)]
#[path = "saga_tests.rs"]
mod tests;
