// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint file for the deployment store.
//!
//! A snapshot holds the deployments and saga log as of WAL sequence `seq`.
//! The WAL is truncated up to that sequence after a save, so the snapshot
//! is the only copy of older history: a file this build cannot read is an
//! error, never silently replaced.

use crate::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Layout of [`MaterializedState`] written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// A loaded checkpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Last WAL sequence reflected in `state`
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

/// Borrowed form written by [`Snapshot::write`], so a checkpoint does not
/// copy the whole saga log while the store lock is held.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    seq: u64,
    state: &'a MaterializedState,
    created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Atomically replace `path` with `state` as of `seq`.
    ///
    /// Writes `<path>.tmp`, fsyncs it, then renames over `path`.
    pub fn write(path: &Path, seq: u64, state: &MaterializedState) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = SnapshotRef {
            version: SNAPSHOT_VERSION,
            seq,
            state,
            created_at: Utc::now(),
        };
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &record)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read the checkpoint at `path`.
    ///
    /// - missing file: `Ok(None)`
    /// - unparseable file (torn write, hand edit): moved to `.bak`, `Ok(None)`
    /// - readable file from another layout version: `Err`, file left in place
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = match serde_json::from_reader(BufReader::new(file)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let bak_path = rotate_bak_path(path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "unreadable snapshot, rebuilding from WAL",
                );
                fs::rename(path, &bak_path)?;
                return Ok(None);
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        info!(
            seq = snapshot.seq,
            deployments = snapshot.state.deployments.len(),
            created_at = %snapshot.created_at,
            "snapshot loaded",
        );
        Ok(Some(snapshot))
    }
}

/// Backups kept per file: `.bak`, `.bak.2`, `.bak.3`
const MAX_BAK_FILES: u32 = 3;

fn bak_path(path: &Path, n: u32) -> PathBuf {
    if n == 1 {
        path.with_extension("bak")
    } else {
        path.with_extension(format!("bak.{n}"))
    }
}

/// Free `.bak` slot for `path`, aging existing backups by one and dropping
/// the oldest. Shared with the WAL's corrupt-tail handling.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak_path(path, n);
        if src.exists() {
            // rename replaces the oldest slot on unix
            let _ = fs::rename(&src, bak_path(path, n + 1));
        }
    }
    bak_path(path, 1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
