// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator settings from `keel.toml` in the state directory.

use std::path::{Path, PathBuf};

use keel_engine::EngineConfig;
use keel_spec::parse_duration;
use serde::Deserialize;

use super::LifecycleError;

const DEFAULT_SCHEDULER_BIN: &str = "nomad";

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Image registry prefix
    #[serde(default)]
    pub registry: Option<String>,
    /// e.g. "5m"
    #[serde(default)]
    pub health_timeout: Option<String>,
    #[serde(default)]
    pub poll_interval: Option<String>,
    #[serde(default)]
    pub datacenters: Vec<String>,
    /// Directory of encrypted per-app secret files
    #[serde(default)]
    pub secrets_dir: Option<PathBuf>,
    /// Command run after the route table changes
    #[serde(default)]
    pub routes_reload: Option<String>,
    #[serde(default)]
    pub scheduler_bin: Option<String>,
}

impl Settings {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&content).map_err(|e| LifecycleError::Settings {
            path: path.to_owned(),
            message: e.to_string(),
        })
    }

    /// Engine configuration rooted at `state_dir`.
    ///
    /// `KEEL_REGISTRY`, `KEEL_HEALTH_TIMEOUT_SECS` and `KEEL_POLL_MS` win over
    /// the file.
    pub fn engine_config(&self, state_dir: &Path) -> Result<EngineConfig, LifecycleError> {
        let mut config =
            EngineConfig::new(state_dir).with_datacenters(self.datacenters.clone());

        if let Some(registry) = crate::env::registry().or_else(|| self.registry.clone()) {
            config = config.with_registry(registry);
        }

        match crate::env::health_timeout() {
            Some(timeout) => config = config.with_health_timeout(timeout),
            None => {
                if let Some(value) = &self.health_timeout {
                    config = config.with_health_timeout(duration("health_timeout", value)?);
                }
            }
        }

        match crate::env::poll_interval() {
            Some(interval) => config = config.with_poll_interval(interval),
            None => {
                if let Some(value) = &self.poll_interval {
                    config = config.with_poll_interval(duration("poll_interval", value)?);
                }
            }
        }

        Ok(config)
    }

    pub fn scheduler_bin(&self) -> &str {
        self.scheduler_bin
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SCHEDULER_BIN)
    }

    /// Secrets directory, defaulting to `<state_dir>/secrets`.
    pub fn secrets_dir(&self, state_dir: &Path) -> PathBuf {
        self.secrets_dir
            .clone()
            .unwrap_or_else(|| state_dir.join("secrets"))
    }
}

fn duration(key: &'static str, value: &str) -> Result<std::time::Duration, LifecycleError> {
    match parse_duration(value) {
        Ok(d) if !d.is_zero() => Ok(d),
        Ok(_) => Err(LifecycleError::InvalidSetting {
            key,
            message: "must be greater than zero".to_string(),
        }),
        Err(message) => Err(LifecycleError::InvalidSetting { key, message }),
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
