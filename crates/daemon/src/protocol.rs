// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use std::path::PathBuf;

use keel_core::{Deployment, DeploymentId, SagaEvent, SagaId};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

/// Default page size for history queries
pub const DEFAULT_LIMIT: usize = 20;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Request from a client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Start a deploy of the spec at `spec_path`
    Deploy {
        spec_path: PathBuf,
        /// Empty means the spec's source branch
        #[serde(default)]
        git_ref: String,
    },

    /// Roll the app back to its last successful deployment
    Rollback { spec_path: PathBuf },

    /// Stop every job of the app and drop its routes
    Stop {
        spec_path: PathBuf,
        #[serde(default)]
        purge: bool,
    },

    /// Set the instance count of one process
    Scale {
        spec_path: PathBuf,
        process: String,
        count: u32,
    },

    /// Deployment history of one app, newest first
    Deployments {
        app: String,
        #[serde(default = "default_limit")]
        limit: usize,
    },

    /// Every event of one saga, oldest first
    SagaEvents { saga_id: SagaId },

    /// Most recent events of one app
    AppEvents {
        app: String,
        #[serde(default = "default_limit")]
        limit: usize,
    },

    /// Most recent events across all apps
    RecentEvents {
        #[serde(default = "default_limit")]
        limit: usize,
    },

    /// List deployable specs under a directory
    Discover { dir: PathBuf },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

/// Response from the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// A pipeline was launched; follow it through the saga log
    Started {
        saga_id: SagaId,
        deployment_id: DeploymentId,
    },

    Deployments { deployments: Vec<Deployment> },

    Events { events: Vec<SagaEvent> },

    Discovered {
        apps: Vec<DiscoveredSpec>,
        #[serde(default)]
        skipped: Vec<SkippedSpec>,
    },

    /// Daemon status
    Status {
        uptime_secs: u64,
        version: String,
        in_flight: usize,
    },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },
}

/// A spec with `deploy = true`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveredSpec {
    pub app: String,
    pub path: PathBuf,
}

/// A spec file that failed to load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedSpec {
    pub path: PathBuf,
    pub error: String,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
