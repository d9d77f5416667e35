// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting for file names.

use chrono::{DateTime, Utc};

/// Format epoch milliseconds as a compact UTC stamp: `"20260101T000000Z"`.
///
/// Used in file names, so it never contains separators other than `T`.
/// Out-of-range values clamp to the epoch.
pub fn format_utc_compact(epoch_ms: u64) -> String {
    let at = i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default();
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
