// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::test_support::{deployment, saga_event};

#[test]
fn serialized_type_tag_matches_name() {
    let events = vec![
        StoreEvent::DeploymentCreated {
            deployment: deployment("d1", "blog", DeploymentStatus::Queued, 1_000),
        },
        StoreEvent::DeploymentStatus {
            id: DeploymentId::new("d1"),
            status: DeploymentStatus::Failed,
            finished_at_ms: Some(2_000),
        },
        StoreEvent::DeploymentResolved {
            id: DeploymentId::new("d1"),
            commit_sha: "abc".to_string(),
            image_tag: "blog:abc".to_string(),
        },
        StoreEvent::SagaAppended {
            event: saga_event("e1", "s1", "blog", "step.start", 1_000),
        },
    ];

    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}

#[test]
fn status_without_finish_time_omits_field() {
    let event = StoreEvent::DeploymentStatus {
        id: DeploymentId::new("d1"),
        status: DeploymentStatus::Building,
        finished_at_ms: None,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(
        json,
        r#"{"type":"deployment:status","id":"d1","status":"building"}"#
    );
}
