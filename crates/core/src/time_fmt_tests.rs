// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::format_utc_compact;

#[yare::parameterized(
    epoch       = { 0,                 "19700101T000000Z" },
    new_year    = { 1_767_225_600_000, "20260101T000000Z" },
    leap_day    = { 1_709_210_096_000, "20240229T123456Z" },
    end_of_year = { 1_735_689_599_999, "20241231T235959Z" },
    overflow    = { u64::MAX,          "19700101T000000Z" },
)]
fn utc_compact(ms: u64, expected: &str) {
    assert_eq!(format_utc_compact(ms), expected);
}
