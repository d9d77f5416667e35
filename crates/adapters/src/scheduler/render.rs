// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render job definitions into the scheduler's JSON job format.

use keel_core::{
    BatchJob, HttpCheck, JobDefinition, Network, PortValue, ServiceJob, Task, TaskGroup,
};
use serde_json::{json, Value};

const NANOS_PER_SEC: u64 = 1_000_000_000;

fn nanos(secs: u64) -> u64 {
    secs.saturating_mul(NANOS_PER_SEC)
}

/// Render a job as `{"Job": {...}}`.
pub fn render_job(job: &JobDefinition) -> Value {
    let job = match job {
        JobDefinition::Service(service) => render_service(service),
        JobDefinition::Batch(batch) => render_batch(batch),
    };
    json!({ "Job": job })
}

fn render_service(job: &ServiceJob) -> Value {
    json!({
        "ID": job.id,
        "Name": job.id,
        "Type": "service",
        "Datacenters": job.datacenters,
        "TaskGroups": job.task_groups.iter().map(render_group).collect::<Vec<_>>(),
    })
}

fn render_batch(job: &BatchJob) -> Value {
    json!({
        "ID": job.id,
        "Name": job.id,
        "Type": "batch",
        "Datacenters": job.datacenters,
        "Periodic": {
            "Enabled": true,
            "SpecType": "cron",
            "Spec": job.periodic.cron,
            "ProhibitOverlap": job.periodic.prohibit_overlap,
        },
        "TaskGroups": [{
            "Name": job.group.name,
            "Count": 1,
            "Tasks": [render_task(&job.group.task)],
        }],
    })
}

fn render_group(group: &TaskGroup) -> Value {
    let mut value = json!({
        "Name": group.name,
        "Count": group.count,
        "RestartPolicy": {
            "Attempts": group.restart.attempts,
            "Interval": nanos(group.restart.interval_secs),
            "Delay": nanos(group.restart.delay_secs),
            "Mode": "fail",
        },
        "Update": {
            "MaxParallel": group.update.max_parallel,
            "MinHealthyTime": nanos(group.update.min_healthy_time_secs),
            "AutoRevert": group.update.auto_revert,
            "HealthCheck": "checks",
        },
        "Tasks": [render_task(&group.task)],
    });

    if let Some(ref network) = group.network {
        value["Networks"] = json!([render_network(network)]);
    }
    if !group.services.is_empty() {
        value["Services"] = group
            .services
            .iter()
            .map(|service| {
                let checks: Vec<Value> = service.check.iter().map(render_check).collect();
                json!({
                    "Name": service.name,
                    "PortLabel": service.port_label,
                    "Checks": checks,
                })
            })
            .collect();
    }
    if let Some(limit) = group.max_per_region {
        value["Constraints"] = json!([{
            "LTarget": "${node.region}",
            "Operand": "distinct_property",
            "RTarget": limit.to_string(),
        }]);
    }
    value
}

fn render_network(network: &Network) -> Value {
    let mut reserved = Vec::new();
    let mut dynamic = Vec::new();
    for port in &network.ports {
        match port.value {
            PortValue::Static(value) => reserved.push(json!({
                "Label": port.label,
                "Value": value,
                "To": port.to,
            })),
            PortValue::Dynamic => dynamic.push(json!({
                "Label": port.label,
                "To": port.to,
            })),
        }
    }
    json!({ "ReservedPorts": reserved, "DynamicPorts": dynamic })
}

fn render_check(check: &HttpCheck) -> Value {
    json!({
        "Type": "http",
        "Path": check.path,
        "Interval": nanos(check.interval_secs),
        "Timeout": nanos(check.timeout_secs),
    })
}

fn render_task(task: &Task) -> Value {
    let mut config = json!({ "image": task.image });
    if let Some(ref command) = task.command {
        config["command"] = json!("/bin/sh");
        config["args"] = json!(["-c", command]);
    }
    if !task.ports.is_empty() {
        config["ports"] = json!(task.ports);
    }

    let mut value = json!({
        "Name": task.name,
        "Driver": "docker",
        "Config": config,
        "Env": task.env,
        "Resources": {
            "CPU": task.resources.cpu,
            "MemoryMB": task.resources.memory_mb,
        },
    });
    if let Some(ref signal) = task.kill_signal {
        value["KillSignal"] = json!(signal);
    }
    if let Some(timeout) = task.kill_timeout_secs {
        value["KillTimeout"] = json!(nanos(timeout));
    }
    value
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
