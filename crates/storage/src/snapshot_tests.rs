// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::StoreEvent;
use keel_core::test_support::{deployment, saga_event};
use keel_core::DeploymentStatus;
use tempfile::tempdir;

fn sample_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply_event(&StoreEvent::DeploymentCreated {
        deployment: deployment("d1", "blog", DeploymentStatus::Deployed, 1_000),
    });
    state.apply_event(&StoreEvent::SagaAppended {
        event: saga_event("e1", "saga-d1", "blog", "deploy.start", 1_000),
    });
    state
}

#[test]
fn save_then_load_preserves_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    Snapshot::write(&path, 42, &sample_state()).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.version, SNAPSHOT_VERSION);
    assert_eq!(loaded.seq, 42);
    assert_eq!(loaded.state, sample_state());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn missing_snapshot_is_none() {
    let dir = tempdir().unwrap();
    assert!(Snapshot::load(&dir.path().join("nope.json")).unwrap().is_none());
}

#[test]
fn corrupt_snapshot_moves_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(Snapshot::load(&path).unwrap().is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn other_layout_version_is_an_error_and_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    Snapshot::write(&path, 7, &sample_state()).unwrap();

    let mut raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    raw["version"] = serde_json::json!(SNAPSHOT_VERSION + 1);
    std::fs::write(&path, raw.to_string()).unwrap();

    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(
        err,
        SnapshotError::UnsupportedVersion { found } if found == SNAPSHOT_VERSION + 1
    ));
    assert!(path.exists());
    assert!(!path.with_extension("bak").exists());
}

#[test]
fn bak_rotation_keeps_three() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    for round in 0..4 {
        std::fs::write(&path, format!("corrupt {round}")).unwrap();
        Snapshot::load(&path).unwrap();
    }

    assert_eq!(
        std::fs::read_to_string(path.with_extension("bak")).unwrap(),
        "corrupt 3"
    );
    assert_eq!(
        std::fs::read_to_string(path.with_extension("bak.3")).unwrap(),
        "corrupt 1"
    );
    assert!(!path.with_extension("bak.4").exists());
}
