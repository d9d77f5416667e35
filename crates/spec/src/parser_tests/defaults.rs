// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Defaulting of optional process fields.

use crate::{parse_app_spec, ProcessMode, DEFAULT_CPU, DEFAULT_MEMORY_MB};
use std::time::Duration;

#[test]
fn minimal_process_gets_defaults() {
    let spec = parse_app_spec(
        r#"
name = "api"

[process.web]
port = 3000
"#,
    )
    .unwrap();

    let web = &spec.processes["web"];
    assert_eq!(web.scaling.min, 1);
    assert_eq!(web.scaling.max(), 1);
    assert_eq!(web.scaling.per_region, None);
    assert_eq!(web.resources.cpu, DEFAULT_CPU);
    assert_eq!(web.resources.memory, DEFAULT_MEMORY_MB);
    assert!(web.health.is_none());
    assert!(web.drain.is_none());
    assert_eq!(web.command(), None);
    assert!(!spec.deploy);
    assert!(spec.build.is_none());
    assert!(spec.source.is_none());
    assert_eq!(spec.relational_database(), None);
}

#[test]
fn health_and_drain_fall_back_to_defaults() {
    let spec = parse_app_spec(
        r#"
name = "api"

[process.web]
port = 3000
health = { path = "/up" }
drain = {}
"#,
    )
    .unwrap();

    let web = &spec.processes["web"];
    let health = web.health.as_ref().unwrap();
    assert_eq!(health.interval(), Duration::from_secs(10));
    assert_eq!(health.timeout(), Duration::from_secs(5));
    let drain = web.drain.as_ref().unwrap();
    assert_eq!(drain.signal(), "SIGTERM");
    assert_eq!(drain.timeout(), Duration::from_secs(30));
}

#[test]
fn explicit_values_override_defaults() {
    let spec = parse_app_spec(
        r#"
name = "api"

[process.worker]
run = "./worker"
drain = { signal = "SIGINT", timeout = "2m" }
resources = { cpu = 500, memory = 1024 }
scaling = { min = 0, max = 3, per_region = 1 }
"#,
    )
    .unwrap();

    let worker = &spec.processes["worker"];
    let drain = worker.drain.as_ref().unwrap();
    assert_eq!(drain.signal(), "SIGINT");
    assert_eq!(drain.timeout(), Duration::from_secs(120));
    assert_eq!(worker.resources.cpu, 500);
    assert_eq!(worker.resources.memory, 1024);
    assert!(worker.scaling.allows(0));
    assert!(worker.scaling.allows(3));
    assert!(!worker.scaling.allows(4));
    assert_eq!(worker.scaling.per_region, Some(1));
}

#[test]
fn function_process_is_not_scheduled() {
    let spec = parse_app_spec(
        r#"
name = "api"

[process.thumbs]
run = "./thumbs"
function = { timeout = "30s" }
"#,
    )
    .unwrap();

    let thumbs = &spec.processes["thumbs"];
    assert_eq!(thumbs.mode(), ProcessMode::Function);
    assert_eq!(spec.long_running().count(), 1);
    assert_eq!(spec.scheduled().count(), 0);
}

#[test]
fn blank_commands_are_ignored() {
    let spec = parse_app_spec(
        r#"
name = "api"

[test]
command = "  "

[process.web]
port = 3000
"#,
    )
    .unwrap();
    assert_eq!(spec.test_command(), None);
}

#[test]
fn other_dependencies_are_recorded() {
    let spec = parse_app_spec(
        r#"
name = "api"

[dependencies.redis]
version = "7"

[process.web]
port = 3000
"#,
    )
    .unwrap();
    assert!(spec.dependencies.other.contains_key("redis"));
    assert_eq!(spec.relational_database(), None);
}
