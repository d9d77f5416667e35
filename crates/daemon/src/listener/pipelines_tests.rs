// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::super::handle_request;
use super::super::test_ctx::{harness, WEB_SPEC};
use crate::protocol::{Request, Response};
use keel_adapters::SchedulerCall;
use keel_core::{action, DeploymentStatus};
use keel_storage::{DeploymentStore, SagaStore};

#[tokio::test(start_paused = true)]
async fn deploy_replies_started_before_pipeline_finishes() {
    let h = harness();
    let spec_path = h.write_spec("shop/keel.toml", WEB_SPEC);

    let response = handle_request(
        &h.ctx,
        Request::Deploy {
            spec_path,
            git_ref: "v1.2.0".to_string(),
        },
    )
    .await;

    let Response::Started {
        saga_id,
        deployment_id,
    } = response
    else {
        panic!("expected Started, got {response:?}");
    };
    let deployment = h.store.get(&deployment_id).unwrap().unwrap();
    assert_eq!(deployment.app, "shop");
    assert_eq!(deployment.commit_sha, "v1.2.0");
    assert_eq!(deployment.status, DeploymentStatus::Queued);

    let events = h.store.list_by_saga(&saga_id).unwrap();
    assert!(events[0].is_action(action::DEPLOY_START));
}

#[tokio::test]
async fn deploy_of_missing_spec_is_an_error() {
    let h = harness();
    let response = handle_request(
        &h.ctx,
        Request::Deploy {
            spec_path: h.dir.path().join("nope.toml"),
            git_ref: String::new(),
        },
    )
    .await;

    assert!(matches!(response, Response::Error { .. }), "{response:?}");
    assert!(h.store.list_recent(10).unwrap().is_empty());
}

#[tokio::test]
async fn deploy_of_invalid_spec_is_an_error() {
    let h = harness();
    let spec_path = h.write_spec("bad.toml", "name = \"\"\n");

    let response = handle_request(
        &h.ctx,
        Request::Deploy {
            spec_path,
            git_ref: String::new(),
        },
    )
    .await;

    assert!(matches!(response, Response::Error { .. }), "{response:?}");
}

#[tokio::test(start_paused = true)]
async fn rollback_replies_started() {
    let h = harness();
    let spec_path = h.write_spec("shop/keel.toml", WEB_SPEC);

    let response = handle_request(&h.ctx, Request::Rollback { spec_path }).await;

    let Response::Started { saga_id, .. } = response else {
        panic!("expected Started, got {response:?}");
    };
    let events = h.store.list_by_saga(&saga_id).unwrap();
    assert_eq!(events[0].app, "shop");
}

#[tokio::test]
async fn stop_tolerates_unknown_jobs() {
    let h = harness();
    let spec_path = h.write_spec("shop.toml", WEB_SPEC);

    let response = handle_request(
        &h.ctx,
        Request::Stop {
            spec_path,
            purge: false,
        },
    )
    .await;

    assert_eq!(response, Response::Ok);
    assert_eq!(
        h.scheduler.calls(),
        vec![
            SchedulerCall::Stop {
                job_id: "shop".to_string(),
                purge: false
            },
            SchedulerCall::Stop {
                job_id: "shop-nightly".to_string(),
                purge: false
            },
        ]
    );
    assert!(h.router.routes().is_empty());
}

#[tokio::test]
async fn scale_within_bounds() {
    let h = harness();
    let spec_path = h.write_spec("shop.toml", WEB_SPEC);

    let response = handle_request(
        &h.ctx,
        Request::Scale {
            spec_path,
            process: "web".to_string(),
            count: 3,
        },
    )
    .await;

    assert_eq!(response, Response::Ok);
    assert_eq!(
        h.scheduler.calls(),
        vec![SchedulerCall::Scale {
            job_id: "shop".to_string(),
            group: "web".to_string(),
            count: 3
        }]
    );
}

#[tokio::test]
async fn scale_rejections() {
    let h = harness();
    let spec_path = h.write_spec("shop.toml", WEB_SPEC);

    for (process, count) in [("web", 4), ("web", 0), ("nightly", 1), ("api", 1)] {
        let response = handle_request(
            &h.ctx,
            Request::Scale {
                spec_path: spec_path.clone(),
                process: process.to_string(),
                count,
            },
        )
        .await;
        assert!(
            matches!(response, Response::Error { .. }),
            "{process} x{count}: {response:?}"
        );
    }
    assert!(h.scheduler.calls().is_empty());
}
