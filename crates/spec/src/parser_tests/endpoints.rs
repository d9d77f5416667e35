// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint binding and validation.

use super::assert_toml_err;
use crate::parse_app_spec;

#[test]
fn bare_endpoint_binds_first_process_with_port() {
    let spec = parse_app_spec(
        r#"
name = "shop"
endpoints = ["shop.example.com"]

[process.worker]
run = "./worker"

[process.web]
port = 8080

[process.admin]
port = 9090
"#,
    )
    .unwrap();
    assert_eq!(spec.endpoints[0].process, "web");
}

#[test]
fn explicit_endpoint_target_is_kept() {
    let spec = parse_app_spec(
        r#"
name = "shop"
endpoints = ["shop.example.com", { host = "admin.example.com", process = "admin" }]

[process.web]
port = 8080

[process.admin]
port = 9090
"#,
    )
    .unwrap();
    assert_eq!(spec.endpoints[0].process, "web");
    assert_eq!(spec.endpoints[1].host, "admin.example.com");
    assert_eq!(spec.endpoints[1].process, "admin");
}

#[test]
fn endpoint_without_any_port_is_rejected() {
    assert_toml_err(
        r#"
name = "shop"
endpoints = ["shop.example.com"]

[process.worker]
run = "./worker"
"#,
        &["endpoints[0]", "no process declares a port"],
    );
}

#[test]
fn endpoint_to_unknown_process_is_rejected() {
    assert_toml_err(
        r#"
name = "shop"
endpoints = [{ host = "shop.example.com", process = "api" }]

[process.web]
port = 8080
"#,
        &["unknown process 'api'", "available processes: web"],
    );
}

#[test]
fn endpoint_to_portless_process_is_rejected() {
    assert_toml_err(
        r#"
name = "shop"
endpoints = [{ host = "shop.example.com", process = "worker" }]

[process.web]
port = 8080

[process.worker]
run = "./worker"
"#,
        &["targets process 'worker' which declares no port"],
    );
}
