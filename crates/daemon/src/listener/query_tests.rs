// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::super::handle_request;
use super::super::test_ctx::{harness, Harness, WEB_SPEC};
use crate::protocol::{DiscoveredSpec, Request, Response};
use keel_core::test_support::{deployment, saga_event};
use keel_core::{DeploymentStatus, SagaId};
use keel_storage::{DeploymentStore, SagaStore};

fn seed(h: &Harness) {
    for (id, status, at) in [
        ("d1", DeploymentStatus::Deployed, 1_000),
        ("d2", DeploymentStatus::Failed, 2_000),
        ("d3", DeploymentStatus::Building, 3_000),
    ] {
        h.store.insert(&deployment(id, "shop", status, at)).unwrap();
    }
    h.store
        .insert(&deployment("o1", "other", DeploymentStatus::Queued, 4_000))
        .unwrap();

    h.store
        .append(&saga_event("e1", "saga-d1", "shop", "deploy.start", 1_000))
        .unwrap();
    h.store
        .append(&saga_event("e2", "saga-d1", "shop", "deploy.complete", 1_500))
        .unwrap();
    h.store
        .append(&saga_event("e3", "saga-o1", "other", "deploy.start", 4_000))
        .unwrap();
}

#[tokio::test]
async fn deployments_newest_first_with_limit() {
    let h = harness();
    seed(&h);

    let response = handle_request(
        &h.ctx,
        Request::Deployments {
            app: "shop".to_string(),
            limit: 2,
        },
    )
    .await;

    let Response::Deployments { deployments } = response else {
        panic!("expected Deployments, got {response:?}");
    };
    let ids: Vec<&str> = deployments.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d3", "d2"]);
}

#[tokio::test]
async fn saga_events_oldest_first() {
    let h = harness();
    seed(&h);

    let response = handle_request(
        &h.ctx,
        Request::SagaEvents {
            saga_id: SagaId::new("saga-d1"),
        },
    )
    .await;

    let Response::Events { events } = response else {
        panic!("expected Events, got {response:?}");
    };
    let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["deploy.start", "deploy.complete"]);
}

#[tokio::test]
async fn app_and_recent_events() {
    let h = harness();
    seed(&h);

    let app = handle_request(
        &h.ctx,
        Request::AppEvents {
            app: "other".to_string(),
            limit: 10,
        },
    )
    .await;
    let Response::Events { events } = app else {
        panic!("expected Events, got {app:?}");
    };
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].app, "other");

    let recent = handle_request(&h.ctx, Request::RecentEvents { limit: 2 }).await;
    let Response::Events { events } = recent else {
        panic!("expected Events, got {recent:?}");
    };
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e3", "e2"]);
}

#[tokio::test]
async fn discover_reports_opted_in_and_skipped() {
    let h = harness();
    h.write_spec(
        "apps/shop/keel.toml",
        &WEB_SPEC.replace("name = \"shop\"", "name = \"shop\"\ndeploy = true"),
    );
    h.write_spec(
        "apps/draft.toml",
        "name = \"draft\"\n[process.web]\nport = 80\n",
    );
    h.write_spec("apps/broken.toml", "name = [\n");

    let response = handle_request(
        &h.ctx,
        Request::Discover {
            dir: h.dir.path().join("apps"),
        },
    )
    .await;

    let Response::Discovered { apps, skipped } = response else {
        panic!("expected Discovered, got {response:?}");
    };
    assert_eq!(
        apps,
        vec![DiscoveredSpec {
            app: "shop".to_string(),
            path: h.dir.path().join("apps/shop/keel.toml"),
        }]
    );
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].path.ends_with("broken.toml"));
}

#[tokio::test]
async fn discover_of_missing_dir_is_empty() {
    let h = harness();
    let response = handle_request(
        &h.ctx,
        Request::Discover {
            dir: h.dir.path().join("absent"),
        },
    )
    .await;
    assert_eq!(
        response,
        Response::Discovered {
            apps: vec![],
            skipped: vec![]
        }
    );
}

#[tokio::test]
async fn status_counts_in_flight_deployments() {
    let h = harness();
    seed(&h);

    let response = handle_request(&h.ctx, Request::Status).await;

    let Response::Status {
        version, in_flight, ..
    } = response
    else {
        panic!("expected Status, got {response:?}");
    };
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
    // d3 building, o1 queued
    assert_eq!(in_flight, 2);
}
