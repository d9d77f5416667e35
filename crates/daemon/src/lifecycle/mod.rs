// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

mod settings;
pub use settings::Settings;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use keel_adapters::{
    BroadcastPublisher, FileEdgeRouter, NomadCliAdapter, ShellToolchain, SopsSecretsAdapter,
    TracedScheduler,
};
use keel_core::{SystemClock, UuidIdGen};
use keel_engine::{Engine, EngineDeps};
use keel_storage::{Store, StoreError};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Engine with the production adapters
pub type DaemonEngine = Engine<
    TracedScheduler<NomadCliAdapter>,
    SopsSecretsAdapter,
    FileEdgeRouter,
    ShellToolchain,
    BroadcastPublisher,
    Store,
    SystemClock,
>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/keel)
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    /// Lock file, holds the daemon pid
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Operator settings (`keel.toml`)
    pub settings_path: PathBuf,
    /// Edge router route table
    pub routes_path: PathBuf,
    /// Rendered scheduler job files
    pub jobs_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::at(crate::env::state_dir()?))
    }

    /// Layout rooted at `state_dir`.
    pub fn at(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            settings_path: state_dir.join("keel.toml"),
            routes_path: state_dir.join("routes.json"),
            jobs_path: state_dir.join("jobs"),
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub store: Store,
    pub engine: DaemonEngine,
    /// Live event feed shared with the engine
    pub publisher: BroadcastPublisher,
    pub start_time: Instant,
    /// Deployments marked failed by the startup recovery sweep
    pub recovered: usize,
}

/// Result of daemon startup: the daemon state and its bound socket.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

impl DaemonState {
    /// Write a final snapshot and remove the runtime files.
    ///
    /// Pipelines still running are abandoned; the next startup marks their
    /// deployments failed.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("shutting down daemon");

        match self.store.checkpoint() {
            Ok(seq) => info!(seq, "saved final shutdown snapshot"),
            Err(e) => warn!(error = %e, "failed to save shutdown snapshot"),
        }

        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }

        info!("daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("invalid settings file {path}: {message}")]
    Settings { path: PathBuf, message: String },

    #[error("invalid setting {key}: {message}")]
    InvalidSetting { key: &'static str, message: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // The lock holder owns these files
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // 1. Lock first. Open without truncating so a running daemon's pid survives.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 2. Directories and version file
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.jobs_path)?;
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Settings and engine configuration
    let settings = Settings::load(&config.settings_path)?;
    let engine_config = settings.engine_config(&config.state_dir)?;
    std::fs::create_dir_all(&engine_config.workspace_root)?;
    std::fs::create_dir_all(&engine_config.backup_dir)?;

    // 4. Snapshot plus WAL replay
    let store = Store::open(&config.wal_path, &config.snapshot_path)?;

    // 5. Adapters and engine
    let publisher = BroadcastPublisher::default();
    let scheduler = TracedScheduler::new(NomadCliAdapter::new(
        settings.scheduler_bin(),
        config.jobs_path.clone(),
    ));
    let engine = Engine::new(
        EngineDeps {
            scheduler,
            secrets: SopsSecretsAdapter::new(settings.secrets_dir(&config.state_dir)),
            router: FileEdgeRouter::new(config.routes_path.clone(), settings.routes_reload.clone()),
            toolchain: ShellToolchain::new(),
            publisher: publisher.clone(),
            store: store.clone(),
            ids: Arc::new(UuidIdGen),
        },
        SystemClock,
        engine_config,
    );

    // 6. Nothing survives a restart mid-pipeline
    let recovered = engine.recover_in_flight()?;

    // 7. Remove stale socket and bind (LAST, so clients only connect once ready)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        socket = %config.socket_path.display(),
        recovered,
        "daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            store,
            engine,
            publisher,
            start_time: Instant::now(),
            recovered,
        },
        listener,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../lifecycle_tests/mod.rs"]
mod tests;
