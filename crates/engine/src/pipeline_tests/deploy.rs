// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Successful deploys

use super::*;
use keel_adapters::{RouterCall, ToolCall};
use keel_core::JobDefinition;

#[tokio::test(start_paused = true)]
async fn full_deploy_runs_every_step_in_order() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    let expected: Vec<(String, String)> = DEPLOY_STEPS
        .iter()
        .flat_map(|s| {
            [
                ("step.start".to_string(), s.name().to_string()),
                ("step.complete".to_string(), s.name().to_string()),
            ]
        })
        .collect();
    let events = ctx.saga(&run.saga_id);
    assert_eq!(step_trace(&events), expected);

    let all = actions(&events);
    assert_eq!(all.first(), Some(&"deploy.start"));
    assert_eq!(all.last(), Some(&"deploy.complete"));
    assert!(!all.contains(&"deploy.failed"));
    assert!(events.iter().all(|e| e.saga_id == run.saga_id));
}

#[tokio::test(start_paused = true)]
async fn deployed_record_carries_resolved_image_and_commit() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let d = ctx.deployment(&run.deployment_id);
    assert_eq!(d.status, DeploymentStatus::Deployed);
    assert_eq!(d.commit_sha, "0123456789abcdef0123456789abcdef01234567");
    assert_eq!(d.image_tag, "blog:0123456789ab");
    assert_eq!(d.saga_id, run.saga_id);
    assert_eq!(d.finished_at_ms, Some(FakeClock::START_MS));
}

#[tokio::test(start_paused = true)]
async fn submits_service_and_periodic_jobs() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let submitted = ctx.scheduler.submitted();
    let ids: Vec<&str> = submitted.iter().map(JobDefinition::id).collect();
    assert_eq!(ids, vec!["blog", "blog-cleanup"]);
    match &submitted[0] {
        JobDefinition::Service(job) => {
            assert_eq!(job.task_groups.len(), 1);
            assert_eq!(job.task_groups[0].task.image, "blog:0123456789ab");
        }
        other => panic!("expected service job, got {:?}", other),
    }
    assert!(matches!(submitted[1], JobDefinition::Batch(_)));
}

#[tokio::test(start_paused = true)]
async fn toolchain_calls_follow_step_order() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(
        ctx.toolchain.call_kinds(),
        vec![
            "fetch_source",
            "build_number",
            "build_image",
            "run_command",
            "dump_database",
            "run_command",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn build_passes_build_number_and_records_it() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let build = ctx
        .toolchain
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ToolCall::BuildImage(b) => Some(b),
            _ => None,
        })
        .unwrap();
    assert_eq!(build.tag, "blog:0123456789ab");
    assert_eq!(build.build_args.get("BUILD_NUMBER").map(String::as_str), Some("7"));
    assert!(build.dockerfile.ends_with("Dockerfile"));

    let events = ctx.saga(&run.saga_id);
    let info = events.iter().find(|e| e.action == "build.info").unwrap();
    assert_eq!(info.metadata.get("build_number").map(String::as_str), Some("7"));
}

#[tokio::test(start_paused = true)]
async fn registry_prefixes_tag_and_pushes() {
    let ctx = setup_with(|c| c.with_registry("registry.example.com"));
    ctx.healthy_cluster("blog");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let tag = "registry.example.com/blog:0123456789ab";
    assert!(ctx
        .toolchain
        .calls()
        .contains(&ToolCall::PushImage { tag: tag.to_string() }));
    assert_eq!(ctx.deployment(&run.deployment_id).image_tag, tag);
}

#[tokio::test(start_paused = true)]
async fn no_build_section_defaults_to_latest_without_tool_calls() {
    let ctx = setup();
    ctx.healthy_cluster("worker");
    let (run, status) = ctx.deploy(ctx.spec(WORKER_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    assert_eq!(ctx.deployment(&run.deployment_id).image_tag, "worker:latest");
    let kinds = ctx.toolchain.call_kinds();
    assert!(!kinds.contains(&"build_image"));
    assert!(!kinds.contains(&"build_number"));
    assert!(!kinds.contains(&"push_image"));
}

#[tokio::test(start_paused = true)]
async fn optional_steps_are_no_ops_but_still_logged() {
    let ctx = setup();
    ctx.healthy_cluster("worker");
    let (run, _) = ctx.deploy(ctx.spec(WORKER_SPEC)).await;

    // worker has no source repo, test, database, migration, or endpoints
    assert_eq!(ctx.toolchain.call_kinds(), vec!["local_source"]);
    assert!(ctx.router.calls().is_empty());
    assert_eq!(step_trace(&ctx.saga(&run.saga_id)).len(), DEPLOY_STEPS.len() * 2);
}

#[tokio::test(start_paused = true)]
async fn forge_routes_endpoint_to_healthy_node() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(
        ctx.router.routes().get("blog.example.com").map(String::as_str),
        Some("http://10.0.0.5:8080")
    );
    assert_eq!(ctx.router.calls().last(), Some(&RouterCall::Apply));
}

#[tokio::test(start_paused = true)]
async fn unchanged_route_skips_apply() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let applies = ctx
        .router
        .calls()
        .into_iter()
        .filter(|c| *c == RouterCall::Apply)
        .count();
    assert_eq!(applies, 1);
}

#[tokio::test(start_paused = true)]
async fn secrets_override_spec_env_for_migrate_and_jobs() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.secrets.set("blog", "DATABASE_URL", "postgres://db/blog");
    ctx.secrets.set("blog", "RUST_LOG", "debug");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let commands: Vec<(String, BTreeMap<String, String>)> = ctx
        .toolchain
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ToolCall::RunCommand { command, env, .. } => Some((command, env)),
            _ => None,
        })
        .collect();
    let (test_cmd, test_env) = &commands[0];
    assert_eq!(test_cmd, "make test");
    assert!(!test_env.contains_key("DATABASE_URL"));
    assert_eq!(test_env.get("RUST_LOG").map(String::as_str), Some("info"));

    let (migrate_cmd, migrate_env) = &commands[1];
    assert_eq!(migrate_cmd, "make migrate");
    assert_eq!(
        migrate_env.get("DATABASE_URL").map(String::as_str),
        Some("postgres://db/blog")
    );
    assert_eq!(migrate_env.get("RUST_LOG").map(String::as_str), Some("debug"));

    let Some(JobDefinition::Service(job)) = ctx.scheduler.job("blog") else {
        panic!("service job not submitted");
    };
    assert_eq!(
        job.task_groups[0].task.env.get("DATABASE_URL").map(String::as_str),
        Some("postgres://db/blog")
    );
    // resolved once per run
    assert_eq!(ctx.secrets.requests(), vec!["blog".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn live_events_bracket_each_step() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let steps: Vec<(String, StepState)> = ctx
        .publisher
        .events()
        .into_iter()
        .filter_map(|e| match e {
            LiveEvent::Step { step, status, .. } => Some((step, status)),
            _ => None,
        })
        .collect();
    assert_eq!(steps.len(), DEPLOY_STEPS.len() * 2);
    assert_eq!(steps[0], ("clone".to_string(), StepState::Running));
    assert_eq!(steps[1], ("clone".to_string(), StepState::Complete));
    assert_eq!(ctx.publisher.names().last(), Some(&"deploy.completed"));
}

#[tokio::test(start_paused = true)]
async fn allocation_transitions_publish_progress() {
    let ctx = setup();
    ctx.scheduler
        .push_allocations("blog", vec![keel_core::test_support::pending_alloc("a1")]);
    ctx.scheduler.push_allocations("blog", vec![healthy_alloc("a1")]);
    ctx.healthy_cluster_node();
    let (run, status) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    assert_eq!(status, DeploymentStatus::Deployed);
    let progress: Vec<Option<String>> = ctx
        .publisher
        .events()
        .into_iter()
        .filter_map(|e| match e {
            LiveEvent::Progress { alloc_status, .. } => Some(alloc_status),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![Some("pending".to_string()), Some("running".to_string())]
    );
    let alloc_events = ctx
        .saga(&run.saga_id)
        .into_iter()
        .filter(|e| e.action == "alloc.status")
        .count();
    assert_eq!(alloc_events, 2);
}

#[tokio::test(start_paused = true)]
async fn workdir_is_removed_after_success() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let (run, _) = ctx.deploy(ctx.spec(BLOG_SPEC)).await;

    let workdir = ctx
        .engine
        .config()
        .workspace_root
        .join(format!("blog-{}", run.deployment_id));
    assert!(!workdir.exists());
}

#[tokio::test(start_paused = true)]
async fn explicit_ref_is_passed_to_fetch() {
    let ctx = setup();
    ctx.healthy_cluster("blog");
    let run = ctx
        .engine
        .deploy(ctx.spec(BLOG_SPEC), "v1.2.0", SagaSource::Webhook)
        .unwrap();
    run.wait().await;

    match &ctx.toolchain.calls()[0] {
        ToolCall::FetchSource { repo, git_ref, .. } => {
            assert_eq!(repo, "git@example.com:blog.git");
            assert_eq!(git_ref, "v1.2.0");
        }
        other => panic!("expected fetch, got {:?}", other),
    }
}
