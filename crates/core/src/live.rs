// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events fanned out to live viewers while a pipeline runs.
//!
//! Live events are ephemeral; the saga log is the durable record.

use crate::saga::SagaId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a step as seen by live viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Running,
    Complete,
    Failed,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Running => "running",
            StepState::Complete => "complete",
            StepState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Event published on the live event bus.
///
/// Serialized with a `type` tag: `deploy.step`, `deploy.progress`,
/// `deploy.completed`, `deploy.failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LiveEvent {
    #[serde(rename = "deploy.step")]
    Step {
        app: String,
        step: String,
        saga_id: SagaId,
        status: StepState,
    },

    #[serde(rename = "deploy.progress")]
    Progress {
        app: String,
        step: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alloc_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alloc_status: Option<String>,
    },

    #[serde(rename = "deploy.completed")]
    Completed {
        app: String,
        saga_id: SagaId,
        image_tag: String,
    },

    #[serde(rename = "deploy.failed")]
    Failed {
        app: String,
        saga_id: SagaId,
        error: String,
    },
}

impl LiveEvent {
    pub fn app(&self) -> &str {
        match self {
            LiveEvent::Step { app, .. }
            | LiveEvent::Progress { app, .. }
            | LiveEvent::Completed { app, .. }
            | LiveEvent::Failed { app, .. } => app,
        }
    }

    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Step { .. } => "deploy.step",
            LiveEvent::Progress { .. } => "deploy.progress",
            LiveEvent::Completed { .. } => "deploy.completed",
            LiveEvent::Failed { .. } => "deploy.failed",
        }
    }
}

#[cfg(test)]
#[path = "live_tests.rs"]
mod tests;
