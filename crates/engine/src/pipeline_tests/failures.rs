// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step failures abort the pipeline

use super::*;
use keel_core::test_support::pending_alloc;

/// Assert the run stopped at `step`: one `step.failed`, one `deploy.failed`,
/// and no step started after it.
fn assert_failed_at(ctx: &TestContext, run: &PipelineRunResult, step: &str) -> SagaEvent {
    let events = ctx.saga(&run.saga_id);
    let trace = step_trace(&events);
    let last = trace.last().unwrap();
    assert_eq!(last, &("step.failed".to_string(), step.to_string()));
    assert_eq!(
        trace.iter().filter(|(a, _)| a == "step.start").count(),
        trace.iter().filter(|(a, _)| a != "step.start").count(),
        "every started step has exactly one outcome"
    );

    let failed: Vec<&SagaEvent> = events.iter().filter(|e| e.action == "deploy.failed").collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(actions(&events).last(), Some(&"deploy.failed"));
    assert!(!actions(&events).contains(&"deploy.complete"));

    let d = ctx.deployment(&run.deployment_id);
    assert_eq!(d.status, DeploymentStatus::Failed);
    assert_eq!(d.finished_at_ms, Some(ctx.clock.epoch_ms()));
    assert!(d.image_tag.is_empty());
    assert_eq!(ctx.publisher.names().last(), Some(&"deploy.failed"));

    failed[0].clone()
}

#[tokio::test(start_paused = true)]
async fn submit_failure_stops_before_healthy() {
    let ctx = setup();
    ctx.scheduler.fail_submit("no capacity in dc1");
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Failed);
    let failed = assert_failed_at(&ctx, &run, "submit");
    assert!(failed.message.contains("submit"));
    assert!(failed.message.contains("no capacity in dc1"));

    let events = ctx.saga(&run.saga_id);
    assert!(!step_trace(&events).contains(&("step.start".to_string(), "healthy".to_string())));
    assert!(ctx.router.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failure_skips_snapshot_and_submit() {
    let ctx = setup();
    ctx.toolchain.fail("make test", "2 tests failed");
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Failed);
    let failed = assert_failed_at(&ctx, &run, "test");
    assert!(failed.message.contains("2 tests failed"));
    assert_eq!(failed.metadata.get("step").map(String::as_str), Some("test"));
    assert!(!ctx.toolchain.call_kinds().contains(&"dump_database"));
    assert!(ctx.scheduler.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn migrate_failure_keeps_snapshot_and_submits_nothing() {
    let ctx = setup();
    ctx.toolchain.fail("make migrate", "relation exists");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_failed_at(&ctx, &run, "migrate");
    assert!(ctx.toolchain.call_kinds().contains(&"dump_database"));
    assert!(ctx.scheduler.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn build_failure_reports_tool_output() {
    let ctx = setup();
    ctx.toolchain.fail("build_image", "COPY failed: no such file");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let failed = assert_failed_at(&ctx, &run, "build");
    assert!(failed.message.contains("COPY failed"));
    assert!(!ctx.toolchain.call_kinds().contains(&"run_command"));
}

#[tokio::test(start_paused = true)]
async fn secrets_failure_fails_first_step_needing_env() {
    let ctx = setup();
    ctx.secrets.fail("sops: no key");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let failed = assert_failed_at(&ctx, &run, "migrate");
    assert!(failed.message.contains("sops: no key"));
}

#[tokio::test(start_paused = true)]
async fn pending_allocations_time_out() {
    let ctx = setup();
    ctx.scheduler.set_allocations("blog", vec![pending_alloc("a1")]);
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Failed);
    let failed = assert_failed_at(&ctx, &run, "healthy");
    assert!(failed.message.contains("not healthy after 10s"));
    assert!(ctx.router.routes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn no_allocations_time_out() {
    let ctx = setup();
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    assert_failed_at(&ctx, &run, "healthy");
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_without_local_copy_fails_clone() {
    let ctx = setup();
    ctx.toolchain.fail("fetch_source", "repository not found");
    let mut spec = ctx.spec(BLOG_SPEC);
    spec.root = ctx.dir.path().join("missing");
    let (run, _) = ctx.deploy(spec).await;

    let failed = assert_failed_at(&ctx, &run, "clone");
    assert!(failed.message.contains("repository not found"));
    assert_eq!(ctx.toolchain.call_kinds(), vec!["fetch_source"]);
}

#[tokio::test(start_paused = true)]
async fn no_repo_and_no_local_path_is_configuration_error() {
    let ctx = setup();
    let mut spec = ctx.spec(WORKER_SPEC);
    spec.root = PathBuf::new();
    let (run, _) = ctx.deploy(spec).await;

    let failed = assert_failed_at(&ctx, &run, "clone");
    assert!(failed.message.contains("configuration error"));
    assert!(ctx.toolchain.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn endpoint_without_port_fails_forge() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let mut spec = ctx.spec(BLOG_SPEC);
    if let Some(web) = spec.processes.get_mut("web") {
        web.port = 0;
    }
    let (run, _) = ctx.deploy(spec).await;

    let failed = assert_failed_at(&ctx, &run, "forge");
    assert!(failed.message.contains("declares no port"));
    // earlier side effects stay in place
    assert!(ctx.scheduler.job("blog").is_some());
}

#[tokio::test(start_paused = true)]
async fn failed_run_removes_workdir() {
    let ctx = setup();
    ctx.toolchain.fail("make test", "boom");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let workdir = ctx
        .engine
        .config()
        .workspace_root
        .join(format!("blog-{}", run.deployment_id));
    assert!(!workdir.exists());
}

#[tokio::test(start_paused = true)]
async fn failed_step_publishes_failed_step_event() {
    let ctx = setup();
    ctx.scheduler.fail_submit("down");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let failed_steps: Vec<String> = ctx
        .publisher
        .events()
        .into_iter()
        .filter_map(|e| match e {
            LiveEvent::Step {
                step,
                status: StepState::Failed,
                ..
            } => Some(step),
            _ => None,
        })
        .collect();
    assert_eq!(failed_steps, vec!["submit".to_string()]);
}
