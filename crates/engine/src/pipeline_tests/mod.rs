// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline engine tests

mod deploy;
mod failures;
mod ops;
mod rollback;
mod steps;
mod store_errors;

use super::*;
use keel_adapters::{FakeEdgeRouter, FakePublisher, FakeScheduler, FakeSecrets, FakeToolchain};
use keel_core::test_support::healthy_alloc;
use keel_core::{FakeClock, NodeInfo, SagaEvent, SequentialIdGen};
use keel_spec::parse_app_spec;
use keel_storage::Store;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

type TestEngine = Engine<
    FakeScheduler,
    FakeSecrets,
    FakeEdgeRouter,
    FakeToolchain,
    FakePublisher,
    Store,
    FakeClock,
>;

/// Engine wired to fakes, plus handles to every fake
struct TestContext {
    engine: TestEngine,
    scheduler: FakeScheduler,
    secrets: FakeSecrets,
    router: FakeEdgeRouter,
    toolchain: FakeToolchain,
    publisher: FakePublisher,
    store: Store,
    clock: FakeClock,
    dir: TempDir,
}

/// Full-featured app: build, test, database, migration, web + cron, endpoint
const BLOG_SPEC: &str = r#"
name = "blog"
endpoints = ["blog.example.com"]
secrets = ["DATABASE_URL"]

[env]
RUST_LOG = "info"

[source]
repo = "git@example.com:blog.git"

[build]
dockerfile = "Dockerfile"

[test]
command = "make test"

[migrate]
command = "make migrate"

[dependencies.postgres]
database = "blog_db"

[process.web]
port = 8080
run = "./server"
health = { path = "/up" }

[process.cleanup]
schedule = "0 3 * * *"
run = "./cleanup"
"#;

/// Smallest deployable app: one worker, nothing else
const WORKER_SPEC: &str = r#"
name = "worker"

[process.jobs]
run = "./jobs"
"#;

fn setup() -> TestContext {
    setup_with(|config| config)
}

fn setup_with(configure: impl FnOnce(EngineConfig) -> EngineConfig) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = FakeScheduler::new();
    let secrets = FakeSecrets::new();
    let router = FakeEdgeRouter::new();
    let toolchain = FakeToolchain::new();
    let publisher = FakePublisher::new();
    let store = Store::in_memory();
    let clock = FakeClock::new();

    let config = configure(
        EngineConfig::new(dir.path())
            .with_poll_interval(Duration::from_secs(1))
            .with_health_timeout(Duration::from_secs(10)),
    );
    let engine = Engine::new(
        EngineDeps {
            scheduler: scheduler.clone(),
            secrets: secrets.clone(),
            router: router.clone(),
            toolchain: toolchain.clone(),
            publisher: publisher.clone(),
            store: store.clone(),
            ids: Arc::new(SequentialIdGen::new("id")),
        },
        clock.clone(),
        config,
    );

    TestContext {
        engine,
        scheduler,
        secrets,
        router,
        toolchain,
        publisher,
        store,
        clock,
        dir,
    }
}

impl TestContext {
    /// Parse `content` with its root in a fresh local source directory.
    fn spec(&self, content: &str) -> AppSpec {
        let mut spec = parse_app_spec(content).unwrap();
        spec.root = self.source_dir();
        spec
    }

    fn source_dir(&self) -> PathBuf {
        let root = self.dir.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    /// Report one healthy `web` allocation on a reachable node.
    fn healthy_cluster(&self, job_id: &str) {
        self.scheduler
            .set_allocations(job_id, vec![healthy_alloc("a1")]);
        self.healthy_cluster_node();
    }

    fn healthy_cluster_node(&self) {
        self.scheduler.set_node(
            "node-a1",
            NodeInfo {
                address: "10.0.0.5".to_string(),
                ..NodeInfo::default()
            },
        );
    }

    async fn deploy(&self, spec: AppSpec) -> (PipelineRunResult, DeploymentStatus) {
        let run = self.engine.deploy(spec, "", SagaSource::Api).unwrap();
        let result = PipelineRunResult {
            saga_id: run.saga_id.clone(),
            deployment_id: run.deployment_id.clone(),
        };
        (result, run.wait().await)
    }

    fn saga(&self, saga_id: &SagaId) -> Vec<SagaEvent> {
        self.store.list_by_saga(saga_id).unwrap()
    }

    fn deployment(&self, id: &DeploymentId) -> Deployment {
        self.store.get(id).unwrap().unwrap()
    }
}

/// Ids of a finished run
struct PipelineRunResult {
    saga_id: SagaId,
    deployment_id: DeploymentId,
}

/// `(action, step)` pairs of a saga's step events, in order
fn step_trace(events: &[SagaEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter(|e| e.action.starts_with("step."))
        .map(|e| (e.action.clone(), e.step().unwrap_or_default().to_string()))
        .collect()
}

fn actions(events: &[SagaEvent]) -> Vec<&str> {
    events.iter().map(|e| e.action.as_str()).collect()
}
