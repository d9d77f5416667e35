// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op publisher.

use super::EventPublisher;
use keel_core::LiveEvent;

/// Publisher that discards all events.
///
/// Used for headless runs with no live viewers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpPublisher;

impl NoOpPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl EventPublisher for NoOpPublisher {
    fn publish(&self, _event: LiveEvent) {}
}
