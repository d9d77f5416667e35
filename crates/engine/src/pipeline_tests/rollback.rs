// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollback pipelines

use super::*;
use keel_core::JobDefinition;

async fn rollback(ctx: &TestContext, spec: AppSpec) -> (PipelineRunResult, DeploymentStatus) {
    let run = ctx.engine.rollback(spec, SagaSource::Api).unwrap();
    let result = PipelineRunResult {
        saga_id: run.saga_id.clone(),
        deployment_id: run.deployment_id.clone(),
    };
    (result, run.wait().await)
}

fn service_image(ctx: &TestContext) -> String {
    match ctx.scheduler.job("blog") {
        Some(JobDefinition::Service(job)) => job.task_groups[0].task.image.clone(),
        other => panic!("expected service job, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn rollback_without_prior_deployment_is_configuration_error() {
    let ctx = setup();
    let (run, status) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Failed);
    assert!(ctx.scheduler.submitted().is_empty());

    let events = ctx.saga(&run.saga_id);
    let failed = events.iter().find(|e| e.action == "deploy.failed").unwrap();
    assert!(failed.message.contains("configuration error"));
    assert!(failed.message.contains("no previous successful deployment"));
    assert_eq!(
        step_trace(&events),
        vec![
            ("step.start".to_string(), "submit".to_string()),
            ("step.failed".to_string(), "submit".to_string()),
        ]
    );
    assert!(events.iter().all(|e| e.category == SagaCategory::Rollback));
}

#[tokio::test(start_paused = true)]
async fn rollback_resubmits_last_successful_image() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.toolchain.set_commit("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    let (first, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    // second deploy fails its tests and never becomes a rollback target
    ctx.toolchain.set_commit("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
    ctx.toolchain.fail("make test", "flaky");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let submitted_before = ctx.scheduler.submitted().len();
    let (run, status) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    assert_eq!(service_image(&ctx), "blog:aaaaaaaaaaaa");
    assert_eq!(ctx.scheduler.submitted().len(), submitted_before + 2);

    let d = ctx.deployment(&run.deployment_id);
    let target = ctx.deployment(&first.deployment_id);
    assert_eq!(d.image_tag, target.image_tag);
    assert_eq!(d.commit_sha, target.commit_sha);
}

#[tokio::test(start_paused = true)]
async fn rollback_runs_only_submit_and_healthy() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    let calls_before = ctx.toolchain.calls().len();

    let (run, _) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;

    let started: Vec<String> = step_trace(&ctx.saga(&run.saga_id))
        .into_iter()
        .filter(|(a, _)| a == "step.start")
        .map(|(_, s)| s)
        .collect();
    assert_eq!(started, vec!["submit".to_string(), "healthy".to_string()]);
    assert_eq!(ctx.toolchain.calls().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn rollback_records_its_target() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (first, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    let (run, _) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;

    let events = ctx.saga(&run.saga_id);
    let target = events.iter().find(|e| e.action == "rollback.target").unwrap();
    assert_eq!(
        target.metadata.get("deployment_id").map(String::as_str),
        Some(first.deployment_id.as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn rollback_can_target_an_earlier_rollback() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    let (second, _) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;
    let (third, status) = rollback(&ctx, ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    let events = ctx.saga(&third.saga_id);
    let target = events.iter().find(|e| e.action == "rollback.target").unwrap();
    assert_eq!(
        target.metadata.get("deployment_id").map(String::as_str),
        Some(second.deployment_id.as_str())
    );
}
