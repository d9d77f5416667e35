// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live event publishers

mod broadcast;
mod noop;

pub use broadcast::BroadcastPublisher;
pub use noop::NoOpPublisher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePublisher;

use keel_core::LiveEvent;

/// Fan-out sink for live pipeline events.
///
/// Publishing never blocks and never fails from the publisher's point of view.
pub trait EventPublisher: Clone + Send + Sync + 'static {
    fn publish(&self, event: LiveEvent);
}
