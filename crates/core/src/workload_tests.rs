// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn task(name: &str) -> Task {
    Task {
        name: name.to_string(),
        image: "blog:latest".to_string(),
        command: Some("./run".to_string()),
        env: BTreeMap::new(),
        resources: Resources {
            cpu: 100,
            memory_mb: 128,
        },
        ports: vec![],
        kill_signal: None,
        kill_timeout_secs: None,
    }
}

#[test]
fn job_definition_serializes_with_type_tag() {
    let job = JobDefinition::Batch(BatchJob {
        id: "blog-cleanup".to_string(),
        datacenters: vec!["dc1".to_string()],
        periodic: PeriodicConfig {
            cron: "*/5 * * * *".to_string(),
            prohibit_overlap: true,
        },
        group: BatchGroup {
            name: "cleanup".to_string(),
            task: task("cleanup"),
        },
    });

    let json = serde_json::to_value(&job).unwrap();
    assert_eq!(json["type"], "batch");
    assert_eq!(json["periodic"]["cron"], "*/5 * * * *");
    assert_eq!(job.id(), "blog-cleanup");
    assert_eq!(job.kind(), "batch");

    let back: JobDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, job);
}

#[test]
fn port_value_tags() {
    let fixed = serde_json::to_value(PortValue::Static(8080)).unwrap();
    assert_eq!(fixed, serde_json::json!({"kind": "static", "port": 8080}));
    let dynamic = serde_json::to_value(PortValue::Dynamic).unwrap();
    assert_eq!(dynamic, serde_json::json!({"kind": "dynamic"}));
}

#[test]
fn service_job_group_lookup() {
    let group = TaskGroup {
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
        network: None,
        services: vec![],
        max_per_region: None,
        task: task("web"),
    };
    let job = ServiceJob {
        id: "blog".to_string(),
        datacenters: vec![],
        task_groups: vec![group],
    };
    assert_eq!(job.group("web").map(|g| g.count), Some(2));
    assert!(job.group("worker").is_none());
}
