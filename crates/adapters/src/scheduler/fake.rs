// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake scheduler adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EvalId, SchedulerAdapter, SchedulerError};
use async_trait::async_trait;
use keel_core::{AllocationStatus, JobDefinition, NodeInfo};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Recorded scheduler call
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCall {
    Submit { job_id: String },
    Stop { job_id: String, purge: bool },
    Allocations { job_id: String },
    NodeInfo { node_id: String },
    Scale { job_id: String, group: String, count: u32 },
}

#[derive(Default)]
struct FakeSchedulerState {
    jobs: HashMap<String, JobDefinition>,
    submitted: Vec<JobDefinition>,
    /// Scripted poll results per job; the last entry repeats
    allocations: HashMap<String, VecDeque<Vec<AllocationStatus>>>,
    nodes: HashMap<String, NodeInfo>,
    submit_error: Option<String>,
    calls: Vec<SchedulerCall>,
    next_eval: u64,
}

/// Fake scheduler for testing
#[derive(Clone, Default)]
pub struct FakeScheduler {
    inner: Arc<Mutex<FakeSchedulerState>>,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.inner.lock().calls.clone()
    }

    /// Jobs in submission order
    pub fn submitted(&self) -> Vec<JobDefinition> {
        self.inner.lock().submitted.clone()
    }

    /// Latest registered definition of a job
    pub fn job(&self, job_id: &str) -> Option<JobDefinition> {
        self.inner.lock().jobs.get(job_id).cloned()
    }

    /// Make every subsequent submission fail with `message`
    pub fn fail_submit(&self, message: &str) {
        self.inner.lock().submit_error = Some(message.to_string());
    }

    /// Report `allocs` for a job on every poll
    pub fn set_allocations(&self, job_id: &str, allocs: Vec<AllocationStatus>) {
        self.inner
            .lock()
            .allocations
            .insert(job_id.to_string(), VecDeque::from([allocs]));
    }

    /// Queue one poll result for a job; the last queued result repeats
    pub fn push_allocations(&self, job_id: &str, allocs: Vec<AllocationStatus>) {
        self.inner
            .lock()
            .allocations
            .entry(job_id.to_string())
            .or_default()
            .push_back(allocs);
    }

    pub fn set_node(&self, node_id: &str, info: NodeInfo) {
        self.inner.lock().nodes.insert(node_id.to_string(), info);
    }
}

#[async_trait]
impl SchedulerAdapter for FakeScheduler {
    async fn submit_job(&self, job: &JobDefinition) -> Result<EvalId, SchedulerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SchedulerCall::Submit {
            job_id: job.id().to_string(),
        });
        if let Some(ref message) = inner.submit_error {
            return Err(SchedulerError::CommandFailed(message.clone()));
        }
        inner.jobs.insert(job.id().to_string(), job.clone());
        inner.submitted.push(job.clone());
        inner.next_eval += 1;
        Ok(format!("eval-{}", inner.next_eval))
    }

    async fn stop_job(&self, job_id: &str, purge: bool) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SchedulerCall::Stop {
            job_id: job_id.to_string(),
            purge,
        });
        if inner.jobs.remove(job_id).is_none() {
            return Err(SchedulerError::NotFound(job_id.to_string()));
        }
        Ok(())
    }

    async fn job_allocations(&self, job_id: &str) -> Result<Vec<AllocationStatus>, SchedulerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SchedulerCall::Allocations {
            job_id: job_id.to_string(),
        });
        let Some(queue) = inner.allocations.get_mut(job_id) else {
            return Ok(Vec::new());
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }

    async fn node_info(&self, node_id: &str) -> Result<NodeInfo, SchedulerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SchedulerCall::NodeInfo {
            node_id: node_id.to_string(),
        });
        inner
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(node_id.to_string()))
    }

    async fn scale_job(
        &self,
        job_id: &str,
        group: &str,
        count: u32,
    ) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SchedulerCall::Scale {
            job_id: job_id.to_string(),
            group: group.to_string(),
            count,
        });
        if !inner.jobs.contains_key(job_id) {
            return Err(SchedulerError::NotFound(job_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
