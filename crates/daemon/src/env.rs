// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: KEEL_STATE_DIR > XDG_STATE_HOME/keel > ~/.local/state/keel
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = non_empty("KEEL_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("keel"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/keel"))
}

pub fn registry() -> Option<String> {
    non_empty("KEEL_REGISTRY")
}

pub fn health_timeout() -> Option<Duration> {
    parse_u64("KEEL_HEALTH_TIMEOUT_SECS").map(Duration::from_secs)
}

pub fn poll_interval() -> Option<Duration> {
    parse_u64("KEEL_POLL_MS")
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_u64(key: &str) -> Option<u64> {
    non_empty(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
