// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop, scale, and history queries

use super::*;
use keel_adapters::{RouterCall, SchedulerCall};

#[tokio::test(start_paused = true)]
async fn stop_removes_jobs_and_routes() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let spec = ctx.spec(BLOG_SPEC);
    ctx.deploy(spec.clone()).await;

    ctx.engine.stop(&spec, true).await.unwrap();

    let stops: Vec<SchedulerCall> = ctx
        .scheduler
        .calls()
        .into_iter()
        .filter(|c| matches!(c, SchedulerCall::Stop { .. }))
        .collect();
    assert_eq!(
        stops,
        vec![
            SchedulerCall::Stop {
                job_id: "blog".to_string(),
                purge: true
            },
            SchedulerCall::Stop {
                job_id: "blog-cleanup".to_string(),
                purge: true
            },
        ]
    );
    assert!(ctx.scheduler.job("blog").is_none());
    assert!(ctx.router.routes().is_empty());
    assert_eq!(ctx.router.calls().last(), Some(&RouterCall::Apply));
}

#[tokio::test]
async fn stop_of_never_deployed_app_is_ok() {
    let ctx = setup();
    let spec = ctx.spec(BLOG_SPEC);

    ctx.engine.stop(&spec, false).await.unwrap();

    // nothing routed, nothing to apply
    assert!(!ctx.router.calls().contains(&RouterCall::Apply));
}

#[tokio::test(start_paused = true)]
async fn scale_within_bounds_calls_scheduler() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let spec = ctx.spec(&BLOG_SPEC.replace(
        "health = { path = \"/up\" }",
        "health = { path = \"/up\" }\nscaling = { min = 1, max = 4 }",
    ));
    ctx.deploy(spec.clone()).await;

    ctx.engine.scale(&spec, "web", 3).await.unwrap();

    assert!(ctx.scheduler.calls().contains(&SchedulerCall::Scale {
        job_id: "blog".to_string(),
        group: "web".to_string(),
        count: 3,
    }));
}

#[tokio::test]
async fn scale_rejects_invalid_requests() {
    let ctx = setup();
    let spec = ctx.spec(&BLOG_SPEC.replace(
        "health = { path = \"/up\" }",
        "health = { path = \"/up\" }\nscaling = { min = 1, max = 4 }",
    ));

    for (process, count) in [("web", 5), ("web", 0), ("api", 1), ("cleanup", 1)] {
        let err = ctx.engine.scale(&spec, process, count).await.unwrap_err();
        assert!(
            matches!(err, PipelineError::Configuration(_)),
            "{} x{}: {}",
            process,
            count,
            err
        );
    }
    assert!(ctx.scheduler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn history_lists_newest_first() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (first, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    ctx.clock.advance(Duration::from_secs(60));
    let (second, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let history = ctx.engine.history("blog", 10).unwrap();
    let ids: Vec<&DeploymentId> = history.iter().map(|d| &d.id).collect();
    assert_eq!(ids, vec![&second.deployment_id, &first.deployment_id]);

    assert_eq!(ctx.engine.history("blog", 1).unwrap().len(), 1);
    assert!(ctx.engine.history("other", 10).unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn event_queries_expose_saga_log() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let saga = ctx.engine.saga_events(&run.saga_id).unwrap();
    assert_eq!(saga.first().map(|e| e.action.as_str()), Some("deploy.start"));

    let app = ctx.engine.app_events("blog", 3).unwrap();
    assert_eq!(app.len(), 3);
    assert_eq!(app[0].action, "deploy.complete");

    let recent = ctx.engine.recent_events(1).unwrap();
    assert_eq!(recent[0].action, "deploy.complete");
}
