// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_DATACENTER: &str = "dc1";

/// Paths and knobs handed to the engine at construction
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Parent of per-pipeline working directories
    pub workspace_root: PathBuf,
    /// Where database dumps are written
    pub backup_dir: PathBuf,
    /// Image registry prefix; images are pushed only when set
    pub registry: Option<String>,
    pub health_timeout: Duration,
    pub poll_interval: Duration,
    pub datacenters: Vec<String>,
}

impl EngineConfig {
    /// Defaults rooted at `state_dir`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            workspace_root: state_dir.join("workspaces"),
            backup_dir: state_dir.join("backups"),
            registry: None,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            datacenters: vec![DEFAULT_DATACENTER.to_string()],
        }
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        let registry = registry.into();
        self.registry = (!registry.is_empty()).then_some(registry);
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_datacenters(mut self, datacenters: Vec<String>) -> Self {
        if !datacenters.is_empty() {
            self.datacenters = datacenters;
        }
        self
    }
}
