// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process broadcast publisher

use super::EventPublisher;
use keel_core::LiveEvent;
use tokio::sync::broadcast;

/// Default number of buffered events per subscriber
pub const DEFAULT_CAPACITY: usize = 256;

/// Publisher backed by a tokio broadcast channel.
///
/// Subscribers that fall more than `capacity` events behind lose the oldest
/// events instead of stalling the publisher.
#[derive(Clone, Debug)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<LiveEvent>,
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: LiveEvent) {
        // No subscribers is not an error
        if self.tx.send(event).is_err() {
            tracing::trace!("no live subscribers");
        }
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
