// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::test_support::deployment;
use keel_core::{DeploymentId, DeploymentStatus, FakeClock};
use keel_storage::Store;

fn status_of(store: &Store, id: &str) -> DeploymentStatus {
    store
        .get(&DeploymentId::new(id))
        .unwrap()
        .map(|d| d.status)
        .unwrap()
}

#[test]
fn marks_every_in_flight_deployment_failed() {
    let store = Store::in_memory();
    let clock = FakeClock::new();
    for (id, status) in [
        ("d1", DeploymentStatus::Deployed),
        ("d2", DeploymentStatus::Building),
        ("d3", DeploymentStatus::Submitting),
        ("d4", DeploymentStatus::Failed),
        ("d5", DeploymentStatus::Queued),
    ] {
        store.insert(&deployment(id, "blog", status, 1_000)).unwrap();
    }

    assert_eq!(recover_in_flight(&store, &clock).unwrap(), 3);

    assert_eq!(status_of(&store, "d1"), DeploymentStatus::Deployed);
    assert_eq!(status_of(&store, "d4"), DeploymentStatus::Failed);
    for id in ["d2", "d3", "d5"] {
        assert_eq!(status_of(&store, id), DeploymentStatus::Failed);
        let finished = store.get(&DeploymentId::new(id)).unwrap().unwrap().finished_at_ms;
        assert_eq!(finished, Some(FakeClock::START_MS));
    }
}

#[test]
fn second_sweep_is_a_no_op() {
    let store = Store::in_memory();
    let clock = FakeClock::new();
    store
        .insert(&deployment("d1", "blog", DeploymentStatus::Migrating, 1_000))
        .unwrap();

    assert_eq!(recover_in_flight(&store, &clock).unwrap(), 1);
    clock.advance(std::time::Duration::from_secs(60));
    assert_eq!(recover_in_flight(&store, &clock).unwrap(), 0);

    let d = store.get(&DeploymentId::new("d1")).unwrap().unwrap();
    assert_eq!(d.finished_at_ms, Some(FakeClock::START_MS));
}

#[test]
fn sweep_on_empty_store() {
    let store = Store::in_memory();
    assert_eq!(recover_in_flight(&store, &FakeClock::new()).unwrap(), 0);
}
