// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keel daemon (keeld)
//!
//! Owns the deployment store and runs pipelines. Clients talk to it over a
//! Unix socket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;
mod protocol;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use keel_adapters::BroadcastPublisher;
use keel_storage::Store;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{broadcast, Notify};
use tracing::{debug, error, info, warn};

use crate::lifecycle::{Config, LifecycleError, StartupResult};
use crate::listener::{ListenCtx, Listener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("keeld {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("keeld {}", env!("CARGO_PKG_VERSION"));
                println!("Keel daemon - builds, tests, migrates and rolls out apps");
                println!();
                println!("USAGE:");
                println!("    keeld");
                println!();
                println!("Listens on a Unix socket in the state directory");
                println!("($KEEL_STATE_DIR, default ~/.local/state/keel).");
                println!("Operator settings are read from keel.toml in the same directory.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: keeld [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    rotate_log_if_needed(&config.log_path);
    // Before tracing setup, so the marker lands ahead of any buffered output
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!("starting daemon");

    let StartupResult {
        mut daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("keeld is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Tracing is non-blocking and may not flush before exit
            write_startup_error(&config, &e);
            error!(error = %e, "failed to start daemon");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let shutdown_notify = Arc::new(Notify::new());

    let listener = Listener::new(
        unix_listener,
        ListenCtx {
            engine: daemon.engine.clone(),
            store: daemon.store.clone(),
            start_time: daemon.start_time,
            shutdown: Arc::clone(&shutdown_notify),
        },
    );
    tokio::spawn(listener.run());

    spawn_checkpoint(daemon.store.clone());
    spawn_live_log(&daemon.publisher);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        socket = %config.socket_path.display(),
        recovered = daemon.recovered,
        "daemon ready"
    );

    // Parent processes wait for this line
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => info!("shutdown requested via command"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.shutdown()?;
    info!("daemon stopped");
    Ok(())
}

/// Checkpoint interval (60 seconds)
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically snapshot the store and truncate the WAL.
fn spawn_checkpoint(store: Store) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHECKPOINT_INTERVAL);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match store.checkpoint() {
                Ok(seq) => debug!(seq, "saved checkpoint snapshot"),
                Err(e) => warn!(error = %e, "failed to save checkpoint snapshot"),
            }
        }
    });
}

/// Mirror live pipeline progress into the daemon log.
fn spawn_live_log(publisher: &BroadcastPublisher) {
    let mut rx = publisher.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(event = ?event, "live event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "live log lagged")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Rotate once the log passes this size
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated files kept (`daemon.log.1` .. `daemon.log.3`)
const MAX_ROTATED_LOGS: u32 = 3;

/// Shift `log.N` to `log.N+1` (dropping the oldest) and move `log` to `log.1`.
///
/// Best effort: failures leave the log where it is.
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }

    let rotated = |n: u32| {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        std::path::PathBuf::from(name)
    };

    let _ = std::fs::remove_file(rotated(MAX_ROTATED_LOGS));
    for n in (1..MAX_ROTATED_LOGS).rev() {
        let from = rotated(n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(1));
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- keeld: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- keeld: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write a startup error synchronously so it is visible even on a fast exit.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    let file_name = config
        .log_path
        .file_name()
        .ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
