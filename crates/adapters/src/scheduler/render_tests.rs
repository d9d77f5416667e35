// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::{
    BatchGroup, PeriodicConfig, PortMapping, Resources, RestartPolicy, ServiceRegistration,
    UpdateStrategy,
};
use std::collections::BTreeMap;

fn task() -> Task {
    Task {
        name: "web".to_string(),
        image: "blog:0123456789ab".to_string(),
        command: Some("./server --port 8080".to_string()),
        env: BTreeMap::from([("PORT".to_string(), "8080".to_string())]),
        resources: Resources {
            cpu: 100,
            memory_mb: 128,
        },
        ports: vec!["http".to_string()],
        kill_signal: Some("SIGINT".to_string()),
        kill_timeout_secs: Some(30),
    }
}

fn group(port: PortValue) -> TaskGroup {
    TaskGroup {
        name: "web".to_string(),
        count: 2,
        restart: RestartPolicy {
            attempts: 3,
            interval_secs: 300,
            delay_secs: 15,
        },
        update: UpdateStrategy {
            max_parallel: 1,
            min_healthy_time_secs: 30,
            auto_revert: true,
        },
        network: Some(Network {
            ports: vec![PortMapping {
                label: "http".to_string(),
                value: port,
                to: 8080,
            }],
        }),
        services: vec![ServiceRegistration {
            name: "blog-web".to_string(),
            port_label: "http".to_string(),
            check: Some(HttpCheck {
                path: "/health".to_string(),
                interval_secs: 10,
                timeout_secs: 5,
            }),
        }],
        max_per_region: Some(1),
        task: task(),
    }
}

#[test]
fn service_job_renders_groups_and_checks() {
    let job = JobDefinition::Service(ServiceJob {
        id: "blog".to_string(),
        datacenters: vec!["dc1".to_string()],
        task_groups: vec![group(PortValue::Static(8080))],
    });
    let value = render_job(&job);
    let job = &value["Job"];
    assert_eq!(job["Type"], "service");
    let group = &job["TaskGroups"][0];
    assert_eq!(group["Count"], 2);
    assert_eq!(group["RestartPolicy"]["Interval"], 300_000_000_000u64);
    assert_eq!(group["Update"]["AutoRevert"], true);
    assert_eq!(group["Networks"][0]["ReservedPorts"][0]["Value"], 8080);
    assert_eq!(group["Services"][0]["Checks"][0]["Path"], "/health");
    assert_eq!(group["Constraints"][0]["Operand"], "distinct_property");

    let task = &group["Tasks"][0];
    assert_eq!(task["Config"]["args"][1], "./server --port 8080");
    assert_eq!(task["KillSignal"], "SIGINT");
    assert_eq!(task["Resources"]["MemoryMB"], 128);
}

#[test]
fn dynamic_port_renders_without_value() {
    let job = JobDefinition::Service(ServiceJob {
        id: "blog".to_string(),
        datacenters: vec![],
        task_groups: vec![group(PortValue::Dynamic)],
    });
    let value = render_job(&job);
    let network = &value["Job"]["TaskGroups"][0]["Networks"][0];
    assert_eq!(network["ReservedPorts"].as_array().map(Vec::len), Some(0));
    assert_eq!(network["DynamicPorts"][0]["Label"], "http");
    assert!(network["DynamicPorts"][0].get("Value").is_none());
}

#[test]
fn batch_job_renders_periodic_trigger() {
    let mut task = task();
    task.ports.clear();
    task.command = None;
    let job = JobDefinition::Batch(BatchJob {
        id: "blog-cleanup".to_string(),
        datacenters: vec![],
        periodic: PeriodicConfig {
            cron: "*/5 * * * *".to_string(),
            prohibit_overlap: true,
        },
        group: BatchGroup {
            name: "cleanup".to_string(),
            task,
        },
    });
    let value = render_job(&job);
    let job = &value["Job"];
    assert_eq!(job["Type"], "batch");
    assert_eq!(job["Periodic"]["Spec"], "*/5 * * * *");
    assert_eq!(job["TaskGroups"][0]["Count"], 1);
    assert!(job["TaskGroups"][0].get("Networks").is_none());
    assert!(job["TaskGroups"][0]["Tasks"][0]["Config"].get("command").is_none());
}
