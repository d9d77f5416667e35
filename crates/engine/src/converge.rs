// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health convergence poller.
//!
//! Polls a job's allocations until at least one is healthy and none are
//! pending, or the deadline passes. Observers only hear about allocations
//! whose `(client_status, healthy)` pair changed since the previous poll.

use crate::PipelineError;
use keel_adapters::SchedulerAdapter;
use keel_core::{AllocationStatus, ClientStatus};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Polling bounds for one convergence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    pub timeout: Duration,
    pub interval: Duration,
}

/// Healthy/pending split of one poll, ignoring terminal allocations.
#[derive(Debug, Default)]
pub(crate) struct Classified {
    pub healthy: Vec<AllocationStatus>,
    pub pending: usize,
}

impl Classified {
    pub fn converged(&self) -> bool {
        !self.healthy.is_empty() && self.pending == 0
    }
}

pub(crate) fn classify(allocs: &[AllocationStatus]) -> Classified {
    let mut out = Classified::default();
    for alloc in allocs.iter().filter(|a| !a.is_terminal()) {
        if alloc.is_healthy() {
            out.healthy.push(alloc.clone());
        } else {
            out.pending += 1;
        }
    }
    out
}

/// Last observed state per allocation id.
#[derive(Debug, Default)]
pub(crate) struct TransitionTracker {
    seen: HashMap<String, (ClientStatus, Option<bool>)>,
}

impl TransitionTracker {
    /// Allocations that are new or changed since the previous call.
    pub fn changed<'a>(&mut self, allocs: &'a [AllocationStatus]) -> Vec<&'a AllocationStatus> {
        allocs
            .iter()
            .filter(|a| !a.is_terminal())
            .filter(|a| {
                let state = (a.client_status, a.healthy);
                self.seen.insert(a.id.clone(), state) != Some(state)
            })
            .collect()
    }
}

/// Wait until `job_id` converges, returning its healthy allocations.
///
/// A failed poll is logged and retried on the next tick; only the deadline
/// ends the wait unsuccessfully.
pub async fn wait_healthy<S, F>(
    scheduler: &S,
    app: &str,
    job_id: &str,
    bounds: Convergence,
    mut on_transition: F,
) -> Result<Vec<AllocationStatus>, PipelineError>
where
    S: SchedulerAdapter,
    F: FnMut(&AllocationStatus) -> Result<(), PipelineError>,
{
    let deadline = Instant::now() + bounds.timeout;
    let mut tracker = TransitionTracker::default();

    loop {
        match scheduler.job_allocations(job_id).await {
            Ok(allocs) => {
                for alloc in tracker.changed(&allocs) {
                    on_transition(alloc)?;
                }
                let classified = classify(&allocs);
                debug!(
                    job_id,
                    healthy = classified.healthy.len(),
                    pending = classified.pending,
                    "convergence poll",
                );
                if classified.converged() {
                    return Ok(classified.healthy);
                }
            }
            Err(e) => warn!(job_id, error = %e, "allocation poll failed"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PipelineError::ConvergenceTimeout {
                app: app.to_string(),
                timeout: bounds.timeout,
            });
        }
        tokio::time::sleep(bounds.interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "converge_tests.rs"]
mod tests;
