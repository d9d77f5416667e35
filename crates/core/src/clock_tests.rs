// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_fixed_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_ms(), FakeClock::START_MS);
}

#[test]
fn fake_clock_advance_is_shared_between_clones() {
    let clock = FakeClock::at(1_000);
    let other = clock.clone();
    clock.advance(Duration::from_secs(2));
    assert_eq!(other.epoch_ms(), 3_000);
}

#[test]
fn system_clock_is_after_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
