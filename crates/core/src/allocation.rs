// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler allocation snapshots.
//!
//! Allocations are observed on every poll and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-side status reported by the scheduler for one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Lost,
    /// Any status string this build does not know about
    #[serde(other)]
    Unknown,
}

impl ClientStatus {
    /// Terminal allocations belong to superseded deploys.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ClientStatus::Complete | ClientStatus::Failed | ClientStatus::Lost
        )
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Running => "running",
            ClientStatus::Complete => "complete",
            ClientStatus::Failed => "failed",
            ClientStatus::Lost => "lost",
            ClientStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One running (or recently running) instance of a task group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationStatus {
    pub id: String,
    pub task_group: String,
    pub client_status: ClientStatus,
    /// Deployment health as reported by the scheduler; `None` until known.
    #[serde(default)]
    pub healthy: Option<bool>,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub node_name: String,
}

impl AllocationStatus {
    pub fn is_terminal(&self) -> bool {
        self.client_status.is_terminal()
    }

    /// Healthy only when running and explicitly marked healthy.
    pub fn is_healthy(&self) -> bool {
        self.client_status == ClientStatus::Running && self.healthy == Some(true)
    }
}

/// Node placement details used for edge routing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    pub address: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub region: String,
}

#[cfg(test)]
#[path = "allocation_tests.rs"]
mod tests;
