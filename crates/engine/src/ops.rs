// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct cluster operations and history queries.

use crate::translate::{periodic_job_id, service_job_id};
use crate::{Engine, PipelineError};
use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SchedulerError, SecretsAdapter,
    ToolchainAdapter,
};
use keel_core::{Clock, Deployment, SagaEvent, SagaId};
use keel_spec::AppSpec;
use keel_storage::{DeploymentStore, SagaStore, StoreError};
use tracing::{info, warn};

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
    /// Stop every job of `spec` and drop its edge routes.
    ///
    /// Jobs the scheduler does not know are skipped.
    pub async fn stop(&self, spec: &AppSpec, purge: bool) -> Result<(), PipelineError> {
        let scheduler = &self.inner.deps.scheduler;
        let mut jobs = Vec::new();
        if spec.long_running().next().is_some() {
            jobs.push(service_job_id(spec));
        }
        jobs.extend(spec.scheduled().map(|p| periodic_job_id(spec, &p.name)));

        for job_id in &jobs {
            match scheduler.stop_job(job_id, purge).await {
                Ok(()) => info!(app = %spec.name, job_id = %job_id, purge, "job stopped"),
                Err(SchedulerError::NotFound(_)) => {
                    warn!(app = %spec.name, job_id = %job_id, "job not found, skipping")
                }
                Err(e) => return Err(e.into()),
            }
        }

        let router = &self.inner.deps.router;
        let mut changed = false;
        for endpoint in &spec.endpoints {
            changed |= router.remove_route(&endpoint.host).await?;
        }
        if changed {
            router.apply().await?;
        }
        Ok(())
    }

    /// Set the instance count of one long-running process.
    pub async fn scale(
        &self,
        spec: &AppSpec,
        process: &str,
        count: u32,
    ) -> Result<(), PipelineError> {
        let proc = spec.process(process).ok_or_else(|| {
            PipelineError::Configuration(format!("{} has no process {}", spec.name, process))
        })?;
        if proc.is_scheduled() {
            return Err(PipelineError::Configuration(format!(
                "{} is scheduled and cannot be scaled",
                process
            )));
        }
        if !proc.scaling.allows(count) {
            return Err(PipelineError::Configuration(format!(
                "{} count {} outside {}..={}",
                process,
                count,
                proc.scaling.min,
                proc.scaling.max()
            )));
        }

        self.inner
            .deps
            .scheduler
            .scale_job(&service_job_id(spec), process, count)
            .await?;
        info!(app = %spec.name, process, count, "process scaled");
        Ok(())
    }

    /// Deployments of `app`, newest first.
    pub fn history(&self, app: &str, limit: usize) -> Result<Vec<Deployment>, StoreError> {
        self.inner.deps.store.list_deployments(app, limit)
    }

    pub fn saga_events(&self, saga_id: &SagaId) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.deps.store.list_by_saga(saga_id)
    }

    pub fn app_events(&self, app: &str, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.deps.store.list_by_app(app, limit)
    }

    pub fn recent_events(&self, limit: usize) -> Result<Vec<SagaEvent>, StoreError> {
        self.inner.deps.store.list_recent(limit)
    }
}
