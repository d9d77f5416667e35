// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use keel_core::{Deployment, DeploymentId, DeploymentStatus, SagaId};
use keel_storage::DeploymentStore;
use std::path::Path;
use tempfile::tempdir;

mod startup_shutdown;

fn test_config(dir: &Path) -> Config {
    Config::at(dir.join("state"))
}

/// Leave a deployment mid-pipeline in the store at `config`.
fn seed_in_flight(config: &Config, id: &str, status: DeploymentStatus) {
    std::fs::create_dir_all(config.wal_path.parent().unwrap()).unwrap();
    let store = Store::open(&config.wal_path, &config.snapshot_path).unwrap();
    let deployment = Deployment::queued(
        DeploymentId::new(id),
        "blog",
        "main",
        SagaId::new(format!("saga-{id}")),
        1_000,
    );
    store.insert(&deployment).unwrap();
    if status != DeploymentStatus::Queued {
        store
            .update_status(&deployment.id, status, None)
            .unwrap();
    }
}
