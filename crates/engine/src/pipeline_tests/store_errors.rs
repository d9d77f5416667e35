// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status writes that fail mid-run still leave a well-formed step trace

use super::*;
use keel_storage::{StoreError, WalError};

/// In-memory store that rejects status changes to one status
#[derive(Clone)]
struct RejectingStore {
    inner: Store,
    reject: DeploymentStatus,
}

impl RejectingStore {
    fn new(reject: DeploymentStatus) -> Self {
        Self {
            inner: Store::in_memory(),
            reject,
        }
    }
}

impl SagaStore for RejectingStore {
    fn append(&self, event: &SagaEvent) -> Result<(), StoreError> {
        self.inner.append(event)
    }

    fn list_by_saga(&self, saga_id: &SagaId) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.list_by_saga(saga_id)
    }

    fn list_by_app(&self, app: &str, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.list_by_app(app, limit)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.list_recent(limit)
    }
}

impl DeploymentStore for RejectingStore {
    fn insert(&self, deployment: &Deployment) -> Result<(), StoreError> {
        self.inner.insert(deployment)
    }

    fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
        finished_at_ms: Option<u64>,
    ) -> Result<(), StoreError> {
        if status == self.reject {
            let err = std::io::Error::other("disk full");
            return Err(StoreError::Wal(WalError::Io(err)));
        }
        self.inner.update_status(id, status, finished_at_ms)
    }

    fn resolve(&self, id: &DeploymentId, commit_sha: &str, image_tag: &str) -> Result<(), StoreError> {
        self.inner.resolve(id, commit_sha, image_tag)
    }

    fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, StoreError> {
        self.inner.get(id)
    }

    fn list_deployments(&self, app: &str, limit: usize) -> Result<Vec<Deployment>, StoreError> {
        self.inner.list_deployments(app, limit)
    }

    fn last_successful_deployment(
        &self,
        app: &str,
        exclude: &DeploymentId,
    ) -> Result<Option<Deployment>, StoreError> {
        self.inner.last_successful_deployment(app, exclude)
    }

    fn recover_in_flight_deployments(&self, now_ms: u64) -> Result<usize, StoreError> {
        self.inner.recover_in_flight_deployments(now_ms)
    }
}

/// Deploy the worker app against a store that rejects `reject`.
async fn deploy_rejecting(reject: DeploymentStatus) -> (Vec<SagaEvent>, Deployment) {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = FakeScheduler::new();
    scheduler.set_allocations("worker", vec![healthy_alloc("a1")]);
    let store = RejectingStore::new(reject);
    let engine = Engine::new(
        EngineDeps {
            scheduler,
            secrets: FakeSecrets::new(),
            router: FakeEdgeRouter::new(),
            toolchain: FakeToolchain::new(),
            publisher: FakePublisher::new(),
            store: store.clone(),
            ids: Arc::new(SequentialIdGen::new("id")),
        },
        FakeClock::new(),
        EngineConfig::new(dir.path())
            .with_poll_interval(Duration::from_secs(1))
            .with_health_timeout(Duration::from_secs(10)),
    );

    let mut spec = parse_app_spec(WORKER_SPEC).unwrap();
    spec.root = dir.path().join("src");
    std::fs::create_dir_all(&spec.root).unwrap();

    let run = engine.deploy(spec, "", SagaSource::Api).unwrap();
    let (saga_id, deployment_id) = (run.saga_id.clone(), run.deployment_id.clone());
    assert_eq!(run.wait().await, DeploymentStatus::Failed);

    let events = store.list_by_saga(&saga_id).unwrap();
    let deployment = store.get(&deployment_id).unwrap().unwrap();
    (events, deployment)
}

fn pair(action: &str, step: &str) -> (String, String) {
    (action.to_string(), step.to_string())
}

#[tokio::test(start_paused = true)]
async fn rejected_entry_status_fails_the_started_step() {
    let (events, deployment) = deploy_rejecting(DeploymentStatus::Building).await;

    assert_eq!(
        step_trace(&events),
        vec![pair("step.start", "clone"), pair("step.failed", "clone")]
    );
    assert_eq!(actions(&events).last(), Some(&"deploy.failed"));
    assert_eq!(deployment.status, DeploymentStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn rejected_exit_status_gives_one_outcome() {
    let (events, deployment) = deploy_rejecting(DeploymentStatus::Healthy).await;

    let healthy: Vec<String> = step_trace(&events)
        .into_iter()
        .filter(|(_, step)| step == "healthy")
        .map(|(action, _)| action)
        .collect();
    assert_eq!(healthy, vec!["step.start".to_string(), "step.failed".to_string()]);
    assert_eq!(
        events.iter().filter(|e| e.action == "deploy.failed").count(),
        1
    );
    assert_eq!(deployment.status, DeploymentStatus::Failed);
}
