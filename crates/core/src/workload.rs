// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler-native job definitions.
//!
//! A job is either a long-running [`ServiceJob`] or a periodic [`BatchJob`].
//! Each variant carries only its own fields; adapters dispatch on the variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A job submitted to the cluster scheduler.
///
/// Serializes with `{"type": "service" | "batch", ...fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobDefinition {
    Service(ServiceJob),
    Batch(BatchJob),
}

impl JobDefinition {
    pub fn id(&self) -> &str {
        match self {
            JobDefinition::Service(job) => &job.id,
            JobDefinition::Batch(job) => &job.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobDefinition::Service(_) => "service",
            JobDefinition::Batch(_) => "batch",
        }
    }
}

/// Long-running workload: one task group per long-running process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceJob {
    pub id: String,
    pub datacenters: Vec<String>,
    pub task_groups: Vec<TaskGroup>,
}

impl ServiceJob {
    pub fn group(&self, name: &str) -> Option<&TaskGroup> {
        self.task_groups.iter().find(|g| g.name == name)
    }
}

/// Periodic workload for exactly one scheduled process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub datacenters: Vec<String>,
    pub periodic: PeriodicConfig,
    pub group: BatchGroup,
}

/// Cron trigger for a batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicConfig {
    /// Five-field cron expression
    pub cron: String,
    /// Skip a launch while the previous one is still running
    pub prohibit_overlap: bool,
}

/// The single group of a batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGroup {
    pub name: String,
    pub task: Task,
}

/// Independently scaled unit inside a service job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub name: String,
    pub count: u32,
    pub restart: RestartPolicy,
    pub update: UpdateStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceRegistration>,
    /// Upper bound of instances placed in a single region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_region: Option<u32>,
    pub task: Task,
}

/// Bounded restart behavior applied by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartPolicy {
    pub attempts: u32,
    pub interval_secs: u64,
    pub delay_secs: u64,
}

/// Rolling update behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStrategy {
    pub max_parallel: u32,
    pub min_healthy_time_secs: u64,
    pub auto_revert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub ports: Vec<PortMapping>,
}

/// A named port exposed by the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub label: String,
    pub value: PortValue,
    /// Port the task listens on inside its network namespace
    pub to: u16,
}

/// Host-side port assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "port", rename_all = "lowercase")]
pub enum PortValue {
    /// Reserved host port, required when edge routing targets the group
    Static(u16),
    /// Scheduler-assigned host port
    Dynamic,
}

/// Discoverable service entry registered by a task group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub name: String,
    pub port_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<HttpCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCheck {
    pub path: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

/// A single container task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    pub resources: Resources,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_signal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// CPU in scheduler units (MHz)
    pub cpu: u32,
    pub memory_mb: u32,
}

#[cfg(test)]
#[path = "workload_tests.rs"]
mod tests;
