// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    queued     = { DeploymentStatus::Queued,     false },
    building   = { DeploymentStatus::Building,   false },
    testing    = { DeploymentStatus::Testing,    false },
    migrating  = { DeploymentStatus::Migrating,  false },
    submitting = { DeploymentStatus::Submitting, false },
    healthy    = { DeploymentStatus::Healthy,    false },
    deployed   = { DeploymentStatus::Deployed,   true },
    failed     = { DeploymentStatus::Failed,     true },
)]
fn terminal_statuses(status: DeploymentStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn status_display_matches_serde_and_parse() {
    for status in [
        DeploymentStatus::Queued,
        DeploymentStatus::Submitting,
        DeploymentStatus::Deployed,
        DeploymentStatus::Failed,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status));
        assert_eq!(status.as_str().parse::<DeploymentStatus>(), Ok(status));
    }
    assert!("running".parse::<DeploymentStatus>().is_err());
}

#[test]
fn queued_deployment_has_no_image_tag() {
    let d = Deployment::queued(
        DeploymentId::new("dep-1"),
        "blog",
        "main",
        SagaId::new("saga-1"),
        1_000,
    );
    assert_eq!(d.status, DeploymentStatus::Queued);
    assert!(d.image_tag.is_empty());
    assert!(d.finished_at_ms.is_none());
    assert!(!d.is_terminal());
}
