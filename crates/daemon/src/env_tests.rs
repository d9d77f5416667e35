// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    for key in [
        "KEEL_STATE_DIR",
        "XDG_STATE_HOME",
        "KEEL_REGISTRY",
        "KEEL_HEALTH_TIMEOUT_SECS",
        "KEEL_POLL_MS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn explicit_state_dir_wins() {
    clear();
    std::env::set_var("KEEL_STATE_DIR", "/tmp/keel-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/keel-explicit"));
    clear();
}

#[test]
#[serial]
fn xdg_state_home_gets_keel_subdir() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/keel"));
    clear();
}

#[test]
#[serial]
fn falls_back_to_home() {
    clear();
    let dir = state_dir().unwrap();
    assert!(dir.ends_with(".local/state/keel"));
}

#[test]
#[serial]
fn numeric_overrides_parse_or_are_ignored() {
    clear();
    std::env::set_var("KEEL_HEALTH_TIMEOUT_SECS", "90");
    std::env::set_var("KEEL_POLL_MS", "not-a-number");
    assert_eq!(health_timeout(), Some(Duration::from_secs(90)));
    assert_eq!(poll_interval(), None);

    std::env::set_var("KEEL_POLL_MS", "0");
    assert_eq!(poll_interval(), None);
    std::env::set_var("KEEL_POLL_MS", "250");
    assert_eq!(poll_interval(), Some(Duration::from_millis(250)));
    clear();
}

#[test]
#[serial]
fn blank_registry_is_unset() {
    clear();
    std::env::set_var("KEEL_REGISTRY", "  ");
    assert_eq!(registry(), None);
    std::env::set_var("KEEL_REGISTRY", "ghcr.io/acme");
    assert_eq!(registry().as_deref(), Some("ghcr.io/acme"));
    clear();
}
