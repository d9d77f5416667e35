// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload translator: app spec to scheduler job definitions.
//!
//! Pure functions. The same inputs always produce the same jobs; nothing
//! here reads the clock or generates ids.

use keel_core::{
    BatchGroup, BatchJob, HttpCheck, Network, PeriodicConfig, PortMapping, PortValue, Resources,
    RestartPolicy, ServiceJob, ServiceRegistration, Task, TaskGroup, UpdateStrategy,
};
use keel_spec::{AppSpec, Process};
use std::collections::BTreeMap;

/// Label of the single port a process exposes
pub const PORT_LABEL: &str = "http";

pub const RESTART_POLICY: RestartPolicy = RestartPolicy {
    attempts: 3,
    interval_secs: 300,
    delay_secs: 15,
};

pub const UPDATE_STRATEGY: UpdateStrategy = UpdateStrategy {
    max_parallel: 1,
    min_healthy_time_secs: 30,
    auto_revert: true,
};

/// Service job id for an app.
pub fn service_job_id(spec: &AppSpec) -> String {
    spec.name.clone()
}

/// Periodic job id for one scheduled process.
pub fn periodic_job_id(spec: &AppSpec, process: &str) -> String {
    format!("{}-{}", spec.name, process)
}

/// Service job with one task group per non-scheduled process.
pub fn translate(
    spec: &AppSpec,
    image_tag: &str,
    env: &BTreeMap<String, String>,
    datacenters: &[String],
) -> ServiceJob {
    // Routed endpoints need a predictable host port
    let fixed_ports = spec.has_endpoints();
    ServiceJob {
        id: service_job_id(spec),
        datacenters: datacenters.to_vec(),
        task_groups: spec
            .long_running()
            .map(|process| task_group(spec, process, image_tag, env, fixed_ports))
            .collect(),
    }
}

/// Batch job for exactly one scheduled process.
pub fn translate_periodic(
    spec: &AppSpec,
    process: &Process,
    image_tag: &str,
    env: &BTreeMap<String, String>,
    datacenters: &[String],
) -> BatchJob {
    BatchJob {
        id: periodic_job_id(spec, &process.name),
        datacenters: datacenters.to_vec(),
        periodic: PeriodicConfig {
            cron: process.schedule.trim().to_string(),
            prohibit_overlap: true,
        },
        group: BatchGroup {
            name: process.name.clone(),
            task: Task {
                ports: Vec::new(),
                kill_signal: None,
                kill_timeout_secs: None,
                ..task(process, image_tag, env)
            },
        },
    }
}

fn task_group(
    spec: &AppSpec,
    process: &Process,
    image_tag: &str,
    env: &BTreeMap<String, String>,
    fixed_ports: bool,
) -> TaskGroup {
    let (network, services) = if process.has_port() {
        let value = if fixed_ports {
            PortValue::Static(process.port)
        } else {
            PortValue::Dynamic
        };
        let network = Network {
            ports: vec![PortMapping {
                label: PORT_LABEL.to_string(),
                value,
                to: process.port,
            }],
        };
        let service = ServiceRegistration {
            name: format!("{}-{}", spec.name, process.name),
            port_label: PORT_LABEL.to_string(),
            check: process.health.as_ref().map(|health| HttpCheck {
                path: health.path.clone(),
                interval_secs: health.interval().as_secs(),
                timeout_secs: health.timeout().as_secs(),
            }),
        };
        (Some(network), vec![service])
    } else {
        (None, Vec::new())
    };

    TaskGroup {
        name: process.name.clone(),
        // At least one instance, even for `min = 0`
        count: process.scaling.min.max(1),
        restart: RESTART_POLICY,
        update: UPDATE_STRATEGY,
        network,
        services,
        max_per_region: process.scaling.per_region,
        task: task(process, image_tag, env),
    }
}

fn task(process: &Process, image_tag: &str, env: &BTreeMap<String, String>) -> Task {
    Task {
        name: process.name.clone(),
        image: image_tag.to_string(),
        command: process.command().map(str::to_string),
        env: env.clone(),
        resources: Resources {
            cpu: process.resources.cpu,
            memory_mb: process.resources.memory,
        },
        ports: if process.has_port() {
            vec![PORT_LABEL.to_string()]
        } else {
            Vec::new()
        },
        kill_signal: process.drain.as_ref().map(|d| d.signal().to_string()),
        kill_timeout_secs: process.drain.as_ref().map(|d| d.timeout().as_secs()),
    }
}

#[cfg(test)]
#[path = "translate_tests.rs"]
mod tests;
