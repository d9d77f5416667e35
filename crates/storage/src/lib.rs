// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel-storage: write-ahead log, materialized state, and snapshots

mod event;
mod snapshot;
mod state;
mod store;
mod traits;
mod wal;

pub use event::StoreEvent;
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use store::Store;
pub use traits::{DeploymentStore, SagaStore, StoreError};
pub use wal::{Wal, WalEntry, WalError};
