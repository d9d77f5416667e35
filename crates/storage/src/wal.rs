// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL write-ahead log of store events.
//!
//! Each entry is a single line of JSON: `{"seq":N,"event":{...}}\n`.
//! Appends are buffered until [`Wal::flush`], which writes and fsyncs them in
//! one pass. A torn or unparseable tail found at open is rotated to `.bak`
//! and only the valid prefix is kept.

use crate::event::StoreEvent;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct WalRecordRef<'a> {
    seq: u64,
    event: &'a StoreEvent,
}

#[derive(Deserialize)]
struct WalRecord {
    seq: u64,
    event: StoreEvent,
}

/// A single WAL entry with its sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    pub seq: u64,
    pub event: StoreEvent,
}

/// Valid lines read from the start of the file.
struct Scan {
    entries: Vec<(WalEntry, String)>,
    corrupt: bool,
}

pub struct Wal {
    file: File,
    path: PathBuf,
    /// Highest sequence number assigned so far
    write_seq: u64,
    /// Serialized lines not yet written
    pending: Vec<Vec<u8>>,
}

impl Wal {
    /// Open or create a WAL, repairing a corrupt tail.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = open_append(path)?;
        let scan = scan(&file)?;

        let file = if scan.corrupt {
            drop(file);
            let bak_path = crate::snapshot::rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = scan.entries.len(),
                "corrupt WAL tail, rotating to .bak and keeping valid entries",
            );
            std::fs::rename(path, &bak_path)?;
            write_lines(path, scan.entries.iter().map(|(_, line)| line.as_str()))?;
            open_append(path)?
        } else {
            file
        };

        let write_seq = scan
            .entries
            .iter()
            .map(|(entry, _)| entry.seq)
            .max()
            .unwrap_or(0);

        Ok(Self {
            file,
            path: path.to_owned(),
            write_seq,
            pending: Vec::new(),
        })
    }

    /// Buffer an event and return its sequence number.
    ///
    /// Not durable until [`Wal::flush`] returns.
    pub fn append(&mut self, event: &StoreEvent) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let bytes = serde_json::to_vec(&WalRecordRef { seq, event })?;
        self.pending.push(bytes);
        self.write_seq = seq;
        Ok(seq)
    }

    /// Write buffered entries and fsync.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        for mut line in self.pending.drain(..) {
            line.push(b'\n');
            self.file.write_all(&line)?;
        }
        self.file.sync_all()?;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries with a sequence number greater than `seq`, in file order.
    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let scan = scan(&self.file)?;
        if scan.corrupt {
            warn!(
                path = %self.path.display(),
                "corrupt WAL entry during replay, stopping at corruption point",
            );
        }
        Ok(scan
            .entries
            .into_iter()
            .map(|(entry, _)| entry)
            .filter(|entry| entry.seq > seq)
            .collect())
    }

    /// Drop entries with a sequence number below `seq`.
    ///
    /// Called after a snapshot covering those entries is durable.
    pub fn truncate_before(&mut self, seq: u64) -> Result<(), WalError> {
        self.flush()?;

        let scan = scan(&self.file)?;
        let kept = scan
            .entries
            .iter()
            .filter(|(entry, _)| entry.seq >= seq)
            .map(|(_, line)| line.as_str());

        let tmp_path = self.path.with_extension("tmp");
        write_lines(&tmp_path, kept)?;
        std::fs::rename(&tmp_path, &self.path)?;

        self.file = open_append(&self.path)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> io::Result<()> {
    let mut file = File::create(path)?;
    for line in lines {
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.sync_all()
}

/// Read entries from the start of the file up to the first bad line.
fn scan(file: &File) -> Result<Scan, WalError> {
    let mut reader = BufReader::new(file.try_clone()?);
    reader.seek(SeekFrom::Start(0))?;

    let mut entries = Vec::new();
    let mut corrupt = false;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                corrupt = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<WalRecord>(trimmed) {
            Ok(record) => entries.push((
                WalEntry {
                    seq: record.seq,
                    event: record.event,
                },
                trimmed.to_string(),
            )),
            Err(_) => {
                corrupt = true;
                break;
            }
        }
    }

    Ok(Scan { entries, corrupt })
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
