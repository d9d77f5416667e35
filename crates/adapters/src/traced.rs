// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::scheduler::{EvalId, SchedulerAdapter, SchedulerError};
use async_trait::async_trait;
use keel_core::{AllocationStatus, JobDefinition, NodeInfo};
use tracing::Instrument;

/// Wrapper that adds tracing to any SchedulerAdapter
#[derive(Clone)]
pub struct TracedScheduler<S> {
    inner: S,
}

impl<S> TracedScheduler<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SchedulerAdapter> SchedulerAdapter for TracedScheduler<S> {
    async fn submit_job(&self, job: &JobDefinition) -> Result<EvalId, SchedulerError> {
        async {
            tracing::info!(kind = job.kind(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.submit_job(job).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(eval_id) => tracing::info!(eval_id = eval_id.as_str(), elapsed_ms, "job submitted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "submit failed"),
            }
            result
        }
        .instrument(tracing::info_span!("scheduler.submit", job_id = job.id()))
        .await
    }

    async fn stop_job(&self, job_id: &str, purge: bool) -> Result<(), SchedulerError> {
        let result = self.inner.stop_job(job_id, purge).await;
        tracing::info_span!("scheduler.stop", job_id, purge).in_scope(|| match &result {
            Ok(()) => tracing::info!("stopped"),
            Err(e) => tracing::warn!(error = %e, "stop failed"),
        });
        result
    }

    async fn job_allocations(&self, job_id: &str) -> Result<Vec<AllocationStatus>, SchedulerError> {
        let result = self.inner.job_allocations(job_id).await;
        match &result {
            Ok(allocs) => tracing::trace!(job_id, count = allocs.len(), "polled allocations"),
            Err(e) => tracing::warn!(job_id, error = %e, "allocation poll failed"),
        }
        result
    }

    async fn node_info(&self, node_id: &str) -> Result<NodeInfo, SchedulerError> {
        let result = self.inner.node_info(node_id).await;
        if let Err(ref e) = result {
            tracing::error!(node_id, error = %e, "node lookup failed");
        }
        result
    }

    async fn scale_job(
        &self,
        job_id: &str,
        group: &str,
        count: u32,
    ) -> Result<(), SchedulerError> {
        let result = self.inner.scale_job(job_id, group, count).await;
        tracing::info_span!("scheduler.scale", job_id, group, count).in_scope(|| match &result {
            Ok(()) => tracing::info!("scaled"),
            Err(e) => tracing::error!(error = %e, "scale failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
