// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::test_support::{deployment, saga_event};
use keel_core::DeploymentId;

fn created(id: &str, app: &str, status: DeploymentStatus, started: u64) -> StoreEvent {
    StoreEvent::DeploymentCreated {
        deployment: deployment(id, app, status, started),
    }
}

fn appended(id: &str, saga: &str, app: &str) -> StoreEvent {
    StoreEvent::SagaAppended {
        event: saga_event(id, saga, app, "step.start", 1_000),
    }
}

#[test]
fn status_change_sets_finish_time_only_when_given() {
    let mut state = MaterializedState::default();
    state.apply_event(&created("d1", "blog", DeploymentStatus::Queued, 1_000));

    state.apply_event(&StoreEvent::DeploymentStatus {
        id: DeploymentId::new("d1"),
        status: DeploymentStatus::Building,
        finished_at_ms: None,
    });
    let d = state.deployment("d1").unwrap();
    assert_eq!(d.status, DeploymentStatus::Building);
    assert_eq!(d.finished_at_ms, None);

    state.apply_event(&StoreEvent::DeploymentStatus {
        id: DeploymentId::new("d1"),
        status: DeploymentStatus::Failed,
        finished_at_ms: Some(9_000),
    });
    let d = state.deployment("d1").unwrap();
    assert_eq!(d.status, DeploymentStatus::Failed);
    assert_eq!(d.finished_at_ms, Some(9_000));
}

#[test]
fn resolved_sets_commit_and_tag() {
    let mut state = MaterializedState::default();
    state.apply_event(&created("d1", "blog", DeploymentStatus::Queued, 1_000));
    state.apply_event(&StoreEvent::DeploymentResolved {
        id: DeploymentId::new("d1"),
        commit_sha: "feedface".to_string(),
        image_tag: "blog:feedface".to_string(),
    });

    let d = state.deployment("d1").unwrap();
    assert_eq!(d.commit_sha, "feedface");
    assert_eq!(d.image_tag, "blog:feedface");
}

#[test]
fn events_for_unknown_deployment_are_ignored() {
    let mut state = MaterializedState::default();
    state.apply_event(&StoreEvent::DeploymentStatus {
        id: DeploymentId::new("ghost"),
        status: DeploymentStatus::Failed,
        finished_at_ms: Some(1),
    });
    assert!(state.deployments.is_empty());
}

#[test]
fn replay_is_idempotent() {
    let events = vec![
        created("d1", "blog", DeploymentStatus::Queued, 1_000),
        appended("e1", "saga-d1", "blog"),
    ];
    let mut state = MaterializedState::default();
    for event in events.iter().chain(events.iter()) {
        state.apply_event(event);
    }
    assert_eq!(state.deployments.len(), 1);
    assert_eq!(state.saga_events.len(), 1);
}

#[test]
fn replayed_event_keeps_its_original_position() {
    let mut state = MaterializedState::default();
    state.apply_event(&appended("e1", "saga-d1", "blog"));
    state.apply_event(&appended("e2", "saga-d1", "blog"));
    state.apply_event(&appended("e1", "saga-d1", "blog"));

    let ids: Vec<&str> = state
        .saga(&SagaId::new("saga-d1"))
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["e1", "e2"]);
}

#[test]
fn deployments_for_app_are_newest_first() {
    let mut state = MaterializedState::default();
    state.apply_event(&created("d1", "blog", DeploymentStatus::Deployed, 1_000));
    state.apply_event(&created("d2", "shop", DeploymentStatus::Deployed, 2_000));
    state.apply_event(&created("d3", "blog", DeploymentStatus::Failed, 3_000));
    state.apply_event(&created("d4", "blog", DeploymentStatus::Queued, 3_000));

    let ids: Vec<&str> = state
        .deployments_for("blog")
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(ids, vec!["d4", "d3", "d1"]);
}

#[yare::parameterized(
    skips_excluded   = { "d2", Some("d1") },
    picks_newest     = { "d9", Some("d2") },
)]
fn last_deployed_lookup(exclude: &str, expected: Option<&str>) {
    let mut state = MaterializedState::default();
    state.apply_event(&created("d1", "blog", DeploymentStatus::Deployed, 1_000));
    state.apply_event(&created("d2", "blog", DeploymentStatus::Deployed, 2_000));
    state.apply_event(&created("d3", "blog", DeploymentStatus::Failed, 3_000));

    let found = state.last_deployed("blog", exclude).map(|d| d.id.as_str());
    assert_eq!(found, expected);
}

#[test]
fn last_deployed_none_when_only_self() {
    let mut state = MaterializedState::default();
    state.apply_event(&created("d1", "blog", DeploymentStatus::Deployed, 1_000));
    assert!(state.last_deployed("blog", "d1").is_none());
}

#[test]
fn recent_filters_and_limits_newest_first() {
    let mut state = MaterializedState::default();
    state.apply_event(&appended("e1", "s1", "blog"));
    state.apply_event(&appended("e2", "s2", "shop"));
    state.apply_event(&appended("e3", "s1", "blog"));
    state.apply_event(&appended("e4", "s3", "blog"));

    let ids: Vec<&str> = state
        .recent(2, |e| e.app == "blog")
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["e4", "e3"]);

    let saga: Vec<&str> = state
        .saga(&SagaId::new("s1"))
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(saga, vec!["e1", "e3"]);
}
