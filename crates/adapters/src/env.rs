// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use crate::subprocess::{IMAGE_TIMEOUT, SCHEDULER_TIMEOUT};
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Scheduler CLI call timeout (default: 30s).
pub fn scheduler_timeout() -> Duration {
    parse_duration_ms("KEEL_SCHEDULER_TIMEOUT_MS").unwrap_or(SCHEDULER_TIMEOUT)
}

/// Image build/push timeout (default: 30m).
pub fn image_timeout() -> Duration {
    parse_duration_ms("KEEL_IMAGE_TIMEOUT_MS").unwrap_or(IMAGE_TIMEOUT)
}
