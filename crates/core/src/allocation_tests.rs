// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn alloc(status: ClientStatus, healthy: Option<bool>) -> AllocationStatus {
    AllocationStatus {
        id: "a1".to_string(),
        task_group: "web".to_string(),
        client_status: status,
        healthy,
        node_id: "n1".to_string(),
        node_name: "node-1".to_string(),
    }
}

#[yare::parameterized(
    running_healthy   = { ClientStatus::Running, Some(true),  true },
    running_unhealthy = { ClientStatus::Running, Some(false), false },
    running_unknown   = { ClientStatus::Running, None,        false },
    pending_healthy   = { ClientStatus::Pending, Some(true),  false },
)]
fn healthy_requires_running_and_explicit_flag(
    status: ClientStatus,
    healthy: Option<bool>,
    expected: bool,
) {
    assert_eq!(alloc(status, healthy).is_healthy(), expected);
}

#[yare::parameterized(
    pending  = { ClientStatus::Pending,  false },
    running  = { ClientStatus::Running,  false },
    complete = { ClientStatus::Complete, true },
    failed   = { ClientStatus::Failed,   true },
    lost     = { ClientStatus::Lost,     true },
    unknown  = { ClientStatus::Unknown,  false },
)]
fn terminal_client_statuses(status: ClientStatus, terminal: bool) {
    assert_eq!(alloc(status, None).is_terminal(), terminal);
}

#[test]
fn unknown_status_strings_deserialize() {
    let status: ClientStatus = serde_json::from_str("\"evicted\"").unwrap();
    assert_eq!(status, ClientStatus::Unknown);
}
