// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn event(action: &str, metadata: &[(&str, &str)]) -> SagaEvent {
    SagaEvent {
        id: SagaEventId::new("evt-1"),
        saga_id: SagaId::new("saga-1"),
        timestamp_ms: 42,
        source: SagaSource::Api,
        app: "blog".to_string(),
        category: SagaCategory::Deploy,
        action: action.to_string(),
        message: String::new(),
        metadata: metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[test]
fn step_reads_metadata() {
    let e = event(action::STEP_START, &[("step", "clone")]);
    assert_eq!(e.step(), Some("clone"));
    assert!(e.is_action("step.start"));
    assert_eq!(event("deploy.start", &[]).step(), None);
}

#[test]
fn empty_metadata_is_omitted_from_json() {
    let json = serde_json::to_value(event(action::DEPLOY_START, &[])).unwrap();
    assert!(json.get("metadata").is_none());
    assert_eq!(json["source"], "api");
    assert_eq!(json["category"], "deploy");
}

#[test]
fn source_and_category_display() {
    assert_eq!(SagaSource::Webhook.to_string(), "webhook");
    assert_eq!(SagaSource::Pipeline.to_string(), "pipeline");
    assert_eq!(SagaCategory::Rollback.to_string(), "rollback");
}
