// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::test_support::saga_event;
use std::io::Write;
use tempfile::tempdir;

fn saga(id: &str) -> StoreEvent {
    StoreEvent::SagaAppended {
        event: saga_event(id, "s1", "blog", "step.start", 1_000),
    }
}

#[test]
fn append_is_not_visible_until_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path).unwrap();

    assert_eq!(wal.append(&saga("e1")).unwrap(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

    wal.flush().unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.starts_with(r#"{"seq":1,"event":{"type":"saga:event""#));
}

#[test]
fn reopen_resumes_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&saga("e1")).unwrap();
        wal.append(&saga("e2")).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.append(&saga("e3")).unwrap(), 3);
}

#[test]
fn entries_after_filters_by_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path).unwrap();
    for id in ["e1", "e2", "e3"] {
        wal.append(&saga(id)).unwrap();
    }
    wal.flush().unwrap();

    let seqs: Vec<u64> = wal.entries_after(1).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![2, 3]);
    assert!(wal.entries_after(3).unwrap().is_empty());
}

#[test]
fn corrupt_tail_is_rotated_and_valid_prefix_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&saga("e1")).unwrap();
        wal.append(&saga("e2")).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"seq\":3,\"event\":{\"type\":\"sag").unwrap();
    }

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert!(path.with_extension("bak").exists());
    assert_eq!(wal.entries_after(0).unwrap().len(), 2);

    // New appends land after the repaired prefix
    wal.append(&saga("e3")).unwrap();
    wal.flush().unwrap();
    assert_eq!(wal.entries_after(0).unwrap().len(), 3);
}

#[test]
fn truncate_before_keeps_later_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal = Wal::open(&path).unwrap();
    for id in ["e1", "e2", "e3", "e4"] {
        wal.append(&saga(id)).unwrap();
    }

    wal.truncate_before(3).unwrap();

    let seqs: Vec<u64> = wal.entries_after(0).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![3, 4]);
    assert!(!path.with_extension("tmp").exists());

    wal.append(&saga("e5")).unwrap();
    wal.flush().unwrap();
    let reopened = Wal::open(&path).unwrap();
    assert_eq!(reopened.write_seq(), 5);
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&saga("e1")).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\n\n").unwrap();
    }

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 1);
    assert!(!path.with_extension("bak").exists());
}
