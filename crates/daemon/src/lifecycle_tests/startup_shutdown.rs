// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn config_layout_under_state_dir() {
    let config = Config::at(PathBuf::from("/var/lib/keel"));
    assert_eq!(config.socket_path, PathBuf::from("/var/lib/keel/daemon.sock"));
    assert_eq!(config.lock_path, PathBuf::from("/var/lib/keel/daemon.pid"));
    assert_eq!(config.wal_path, PathBuf::from("/var/lib/keel/wal/events.wal"));
    assert_eq!(config.settings_path, PathBuf::from("/var/lib/keel/keel.toml"));
}

#[tokio::test]
async fn startup_creates_runtime_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    assert!(config.version_path.exists());
    assert!(config.jobs_path.is_dir());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(result.daemon.recovered, 0);
}

#[tokio::test]
async fn startup_marks_interrupted_deployments_failed() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    seed_in_flight(&config, "d-queued", DeploymentStatus::Queued);
    seed_in_flight(&config, "d-building", DeploymentStatus::Building);
    seed_in_flight(&config, "d-done", DeploymentStatus::Deployed);

    let result = startup(&config).await.unwrap();

    assert_eq!(result.daemon.recovered, 2);
    let store = &result.daemon.store;
    for id in ["d-queued", "d-building"] {
        let d = store.get(&DeploymentId::new(id)).unwrap().unwrap();
        assert_eq!(d.status, DeploymentStatus::Failed, "{id}");
        assert!(d.finished_at_ms.is_some(), "{id}");
    }
    let done = store.get(&DeploymentId::new("d-done")).unwrap().unwrap();
    assert_eq!(done.status, DeploymentStatus::Deployed);
}

#[tokio::test]
async fn startup_replaces_stale_socket() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.socket_path, b"stale").unwrap();

    let _result = startup(&config).await.unwrap();

    let meta = std::fs::metadata(&config.socket_path).unwrap();
    use std::os::unix::fs::FileTypeExt;
    assert!(meta.file_type().is_socket());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();

    // Files a running daemon would have
    std::fs::write(&config.socket_path, b"").unwrap();
    std::fs::write(&config.version_path, b"0.1.0").unwrap();

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    use fs2::FileExt;
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    match startup(&config).await {
        Err(LifecycleError::LockFailed(_)) => {}
        Err(e) => panic!("expected LockFailed, got: {e}"),
        Ok(_) => panic!("expected LockFailed, but startup succeeded"),
    }

    assert!(config.socket_path.exists());
    assert!(config.version_path.exists());
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "12345");
}

#[tokio::test]
async fn bad_settings_fail_startup_and_clean_up() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.settings_path, "health_timeout = 5\n").unwrap();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Settings { .. }), "{err}");
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn shutdown_checkpoints_and_removes_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    seed_in_flight(&config, "d1", DeploymentStatus::Deployed);

    let StartupResult { mut daemon, listener } = startup(&config).await.unwrap();
    drop(listener);
    daemon.shutdown().unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
    assert!(config.snapshot_path.exists());
    drop(daemon);

    // Reopening from the snapshot keeps the history
    let store = Store::open(&config.wal_path, &config.snapshot_path).unwrap();
    let d1 = store.get(&DeploymentId::new("d1")).unwrap().unwrap();
    assert_eq!(d1.status, DeploymentStatus::Deployed);
}
