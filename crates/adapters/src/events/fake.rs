// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake publisher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::EventPublisher;
use keel_core::LiveEvent;
use parking_lot::Mutex;
use std::sync::Arc;

/// Publisher that records every event
#[derive(Clone, Default)]
pub struct FakePublisher {
    events: Arc<Mutex<Vec<LiveEvent>>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LiveEvent> {
        self.events.lock().clone()
    }

    /// Wire names of recorded events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(LiveEvent::name).collect()
    }
}

impl EventPublisher for FakePublisher {
    fn publish(&self, event: LiveEvent) {
        self.events.lock().push(event);
    }
}
