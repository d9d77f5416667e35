// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_new_and_display() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
}

#[test]
fn define_id_conversions() {
    let owned: TestId = String::from("owned").into();
    let borrowed: TestId = "borrowed".into();
    assert_eq!(owned, "owned");
    assert!(borrowed == "borrowed");
}

#[test]
fn define_id_borrow_allows_str_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("key"), 1);
    assert_eq!(map.get("key"), Some(&1));

    let id = TestId::new("key");
    let s: &str = id.borrow();
    assert_eq!(s, "key");
}

#[test]
fn define_id_serializes_transparently() {
    let id = TestId::new("saga-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"saga-1\"");
    let back: TestId = serde_json::from_str("\"saga-1\"").unwrap();
    assert_eq!(back, id);
}

#[yare::parameterized(
    shorter_than_n = { "abc",          8, "abc" },
    exact          = { "abcdefgh",     8, "abcdefgh" },
    truncated      = { "abcdefghijkl", 8, "abcdefgh" },
    empty          = { "",             4, "" },
)]
fn short_truncates(input: &str, n: usize, expected: &str) {
    assert_eq!(input.short(n), expected);
    assert_eq!(TestId::new(input).short(n), expected);
}

#[test]
fn sequential_id_gen_counts_from_one() {
    let ids = SequentialIdGen::new("saga");
    assert_eq!(ids.next(), "saga-1");
    assert_eq!(ids.next(), "saga-2");
}

#[test]
fn uuid_id_gen_is_unique() {
    let ids = UuidIdGen;
    assert_ne!(ids.next(), ids.next());
}
