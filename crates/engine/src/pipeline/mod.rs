// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline engine: runs deploy and rollback step sequences.
//!
//! `deploy`/`rollback` persist a queued deployment, log `deploy.start`, and
//! spawn the step sequence as its own task. Progress is observable only
//! through the saga log and the live event publisher.

mod context;
mod steps;

pub use context::{PipelineContext, Step, DEPLOY_STEPS, ROLLBACK_STEPS, SHA_PREFIX_LEN};

use crate::saga::Saga;
use crate::{EngineConfig, PipelineError};
use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SecretsAdapter, ToolchainAdapter,
};
use keel_core::{
    action, Clock, Deployment, DeploymentId, DeploymentStatus, IdGen, LiveEvent, SagaCategory,
    SagaId, SagaSource, StepState,
};
use keel_spec::AppSpec;
use keel_storage::{DeploymentStore, SagaStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

/// Adapter and store dependencies of the engine
pub struct EngineDeps<S, K, R, T, P, St> {
    pub scheduler: S,
    pub secrets: K,
    pub router: R,
    pub toolchain: T,
    pub publisher: P,
    pub store: St,
    pub ids: Arc<dyn IdGen>,
}

pub(crate) struct EngineInner<S, K, R, T, P, St, C> {
    pub deps: EngineDeps<S, K, R, T, P, St>,
    pub clock: C,
    pub config: EngineConfig,
}

/// Orchestrates pipelines. Cloning shares the same dependencies.
pub struct Engine<S, K, R, T, P, St, C> {
    pub(crate) inner: Arc<EngineInner<S, K, R, T, P, St, C>>,
}

impl<S, K, R, T, P, St, C> Clone for Engine<S, K, R, T, P, St, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A launched pipeline
pub struct PipelineRun {
    pub saga_id: SagaId,
    pub deployment_id: DeploymentId,
    handle: JoinHandle<DeploymentStatus>,
}

impl PipelineRun {
    /// Wait for the pipeline task and return the deployment's final status.
    pub async fn wait(self) -> DeploymentStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(e) => {
                error!(saga_id = %self.saga_id, error = %e, "pipeline task aborted");
                DeploymentStatus::Failed
            }
        }
    }
}

impl<S, K, R, T, P, St, C> Engine<S, K, R, T, P, St, C>
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    St: SagaStore + DeploymentStore + Clone + 'static,
    C: Clock,
{
    pub fn new(deps: EngineDeps<S, K, R, T, P, St>, clock: C, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                deps,
                clock,
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    /// Start a deploy of `spec` at `git_ref`.
    pub fn deploy(
        &self,
        spec: AppSpec,
        git_ref: &str,
        source: SagaSource,
    ) -> Result<PipelineRun, PipelineError> {
        let git_ref = match git_ref.trim() {
            "" => spec
                .source
                .as_ref()
                .map(|s| s.branch.clone())
                .unwrap_or_else(|| "main".to_string()),
            r => r.to_string(),
        };
        let message = format!("deploying {} at {}", spec.name, git_ref);
        self.launch(spec, SagaCategory::Deploy, source, git_ref, message)
    }

    /// Start a rollback of `spec` to its last successful deployment.
    pub fn rollback(&self, spec: AppSpec, source: SagaSource) -> Result<PipelineRun, PipelineError> {
        let message = format!("rolling back {}", spec.name);
        self.launch(spec, SagaCategory::Rollback, source, String::new(), message)
    }

    fn saga(&self, app: &str, source: SagaSource, category: SagaCategory) -> Saga<St, C> {
        Saga::new(
            app,
            source,
            category,
            self.inner.deps.store.clone(),
            self.inner.clock.clone(),
            Arc::clone(&self.inner.deps.ids),
        )
    }

    fn launch(
        &self,
        spec: AppSpec,
        category: SagaCategory,
        source: SagaSource,
        git_ref: String,
        message: String,
    ) -> Result<PipelineRun, PipelineError> {
        let saga = self.saga(&spec.name, source, category);
        let deployment_id = DeploymentId::new(self.inner.deps.ids.next());
        let deployment = Deployment::queued(
            deployment_id.clone(),
            spec.name.as_str(),
            git_ref.as_str(),
            saga.id().clone(),
            self.inner.clock.epoch_ms(),
        );
        self.inner.deps.store.insert(&deployment)?;

        let meta = BTreeMap::from([
            ("deployment_id".to_string(), deployment_id.to_string()),
            ("ref".to_string(), git_ref.clone()),
        ]);
        saga.log(action::DEPLOY_START, message, meta)?;

        let workdir = self
            .inner
            .config
            .workspace_root
            .join(format!("{}-{}", spec.name, deployment_id));
        let ctx = PipelineContext::new(
            spec,
            category,
            deployment_id.clone(),
            saga.id().clone(),
            git_ref,
            workdir,
        );
        let steps: &'static [Step] = match category {
            SagaCategory::Deploy => &DEPLOY_STEPS,
            SagaCategory::Rollback => &ROLLBACK_STEPS,
        };

        info!(
            app = ctx.app(),
            saga_id = %saga.id(),
            deployment_id = %deployment_id,
            %category,
            "pipeline started",
        );

        let span = info_span!("pipeline", app = ctx.app(), saga_id = %saga.id());
        let saga_id = saga.id().clone();
        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.run(ctx, saga, steps).await }.instrument(span));

        Ok(PipelineRun {
            saga_id,
            deployment_id,
            handle,
        })
    }

    /// Run steps in order, stopping at the first failure.
    pub(crate) async fn run(
        &self,
        mut ctx: PipelineContext,
        saga: Saga<St, C>,
        steps: &[Step],
    ) -> DeploymentStatus {
        for &step in steps {
            // Without a recorded start there is no step outcome to log
            if let Err(e) = saga.step_start(step.name()) {
                self.abort(&mut ctx, &saga, step, e.into()).await;
                return DeploymentStatus::Failed;
            }
            if let Err(e) = self.run_step(&mut ctx, &saga, step).await {
                self.fail(&mut ctx, &saga, step, e).await;
                return DeploymentStatus::Failed;
            }
        }

        match self.complete(&mut ctx, &saga) {
            Ok(()) => DeploymentStatus::Deployed,
            Err(e) => {
                error!(error = %e, "failed to record pipeline completion");
                self.fail_status(&ctx);
                DeploymentStatus::Failed
            }
        }
    }

    /// Body of a started step. `step.complete` is the last write, so any
    /// error here leaves exactly one outcome for the step.
    async fn run_step(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
        step: Step,
    ) -> Result<(), PipelineError> {
        self.publish_step(ctx, step, StepState::Running);
        if let Some(status) = step.entry_status() {
            self.advance(ctx, status)?;
        }

        let started = Instant::now();
        self.execute(ctx, saga, step).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Some(status) = step.exit_status() {
            self.advance(ctx, status)?;
        }
        saga.step_complete(step.name(), elapsed_ms)?;
        self.publish_step(ctx, step, StepState::Complete);
        info!(step = step.name(), elapsed_ms, "step complete");
        Ok(())
    }

    async fn execute(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
        step: Step,
    ) -> Result<(), PipelineError> {
        match (ctx.category, step) {
            (_, Step::Clone) => self.clone_source(ctx, saga).await,
            (_, Step::Build) => self.build(ctx, saga).await,
            (_, Step::Test) => self.test(ctx).await,
            (_, Step::Snapshot) => self.snapshot(ctx, saga).await,
            (_, Step::Migrate) => self.migrate(ctx).await,
            (SagaCategory::Deploy, Step::Submit) => self.submit(ctx, saga).await,
            (SagaCategory::Rollback, Step::Submit) => self.submit_rollback(ctx, saga).await,
            (_, Step::Healthy) => self.healthy(ctx, saga).await,
            (_, Step::Forge) => self.forge(ctx, saga).await,
            (_, Step::Cleanup) => self.cleanup(ctx).await,
        }
    }

    fn advance(
        &self,
        ctx: &mut PipelineContext,
        status: DeploymentStatus,
    ) -> Result<(), PipelineError> {
        if ctx.status == status {
            return Ok(());
        }
        self.inner
            .deps
            .store
            .update_status(&ctx.deployment_id, status, None)?;
        ctx.status = status;
        Ok(())
    }

    fn publish_step(&self, ctx: &PipelineContext, step: Step, status: StepState) {
        self.inner.deps.publisher.publish(LiveEvent::Step {
            app: ctx.app().to_string(),
            step: step.name().to_string(),
            saga_id: ctx.saga_id.clone(),
            status,
        });
    }

    /// Record a step failure. Earlier side effects are left in place.
    async fn fail(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
        step: Step,
        err: PipelineError,
    ) {
        warn!(step = step.name(), error = %err, "step failed");

        if let Err(e) = saga.step_failed(step.name(), &err) {
            error!(error = %e, "failed to record step failure");
        }
        self.publish_step(ctx, step, StepState::Failed);
        self.abort(ctx, saga, step, err).await;
    }

    /// Mark the run failed without a step outcome.
    async fn abort(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
        step: Step,
        err: PipelineError,
    ) {
        self.fail_status(ctx);
        ctx.status = DeploymentStatus::Failed;

        let message = format!("{} failed: {}", step, err);
        let meta = BTreeMap::from([
            ("step".to_string(), step.name().to_string()),
            ("error".to_string(), err.to_string()),
        ]);
        if let Err(e) = saga.log(action::DEPLOY_FAILED, message.clone(), meta) {
            error!(error = %e, "failed to record pipeline failure");
        }
        self.inner.deps.publisher.publish(LiveEvent::Failed {
            app: ctx.app().to_string(),
            saga_id: ctx.saga_id.clone(),
            error: message,
        });

        self.discard_workdir(ctx).await;
    }

    fn fail_status(&self, ctx: &PipelineContext) {
        let now = self.inner.clock.epoch_ms();
        if let Err(e) =
            self.inner
                .deps
                .store
                .update_status(&ctx.deployment_id, DeploymentStatus::Failed, Some(now))
        {
            error!(error = %e, "failed to mark deployment failed");
        }
    }

    fn complete(&self, ctx: &mut PipelineContext, saga: &Saga<St, C>) -> Result<(), PipelineError> {
        let store = &self.inner.deps.store;
        store.resolve(&ctx.deployment_id, &ctx.commit_sha, &ctx.image_tag)?;
        store.update_status(
            &ctx.deployment_id,
            DeploymentStatus::Deployed,
            Some(self.inner.clock.epoch_ms()),
        )?;
        ctx.status = DeploymentStatus::Deployed;

        let meta = BTreeMap::from([("image_tag".to_string(), ctx.image_tag.clone())]);
        saga.log(
            action::DEPLOY_COMPLETE,
            format!("{} deployed {}", ctx.app(), ctx.image_tag),
            meta,
        )?;
        self.inner.deps.publisher.publish(LiveEvent::Completed {
            app: ctx.app().to_string(),
            saga_id: ctx.saga_id.clone(),
            image_tag: ctx.image_tag.clone(),
        });
        info!(image_tag = %ctx.image_tag, "pipeline complete");
        Ok(())
    }

    /// Best-effort removal of the working directory after a failed run.
    async fn discard_workdir(&self, ctx: &PipelineContext) {
        match tokio::fs::remove_dir_all(&ctx.workdir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                workdir = %ctx.workdir.display(),
                error = %e,
                "failed to remove working directory",
            ),
        }
    }
}

#[cfg(test)]
#[path = "../pipeline_tests/mod.rs"]
mod tests;
