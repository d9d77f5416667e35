// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_spec::parse_app_spec;

const WEB_AND_CRON: &str = r#"
name = "blog"

[process.web]
port = 8080
run = "./server"
health = { path = "/health" }

[process.cleanup]
run = "./cleanup"
schedule = "*/5 * * * *"
"#;

fn env() -> BTreeMap<String, String> {
    BTreeMap::from([("RUST_LOG".to_string(), "info".to_string())])
}

fn dcs() -> Vec<String> {
    vec!["dc1".to_string()]
}

#[test]
fn web_and_scheduled_process_split_into_two_jobs() {
    let spec = parse_app_spec(WEB_AND_CRON).unwrap();

    let job = translate(&spec, "blog:abc", &env(), &dcs());
    assert_eq!(job.id, "blog");
    assert_eq!(job.task_groups.len(), 1);

    let web = &job.task_groups[0];
    assert_eq!(web.name, "web");
    assert_eq!(web.count, 1);
    assert_eq!(web.restart, RESTART_POLICY);
    assert_eq!(web.update, UPDATE_STRATEGY);
    assert_eq!(web.task.image, "blog:abc");
    assert_eq!(web.task.command.as_deref(), Some("./server"));
    assert_eq!(web.task.env, env());
    assert_eq!(web.task.resources.cpu, 100);
    assert_eq!(web.task.resources.memory_mb, 128);

    let service = &web.services[0];
    assert_eq!(service.name, "blog-web");
    let check = service.check.as_ref().unwrap();
    assert_eq!(check.path, "/health");
    assert_eq!((check.interval_secs, check.timeout_secs), (10, 5));

    let cleanup = spec.process("cleanup").unwrap();
    let batch = translate_periodic(&spec, cleanup, "blog:abc", &env(), &dcs());
    assert_eq!(batch.id, "blog-cleanup");
    assert_eq!(batch.periodic.cron, "*/5 * * * *");
    assert!(batch.periodic.prohibit_overlap);
    assert_eq!(batch.group.name, "cleanup");
    assert!(batch.group.task.ports.is_empty());
}

#[test]
fn translation_is_deterministic() {
    let spec = parse_app_spec(WEB_AND_CRON).unwrap();
    let a = translate(&spec, "blog:abc", &env(), &dcs());
    let b = translate(&spec, "blog:abc", &env(), &dcs());
    assert_eq!(a, b);
}

#[yare::parameterized(
    with_endpoints    = { r#"endpoints = ["blog.example.com"]"#, PortValue::Static(8080) },
    without_endpoints = { "",                                   PortValue::Dynamic },
)]
fn port_is_fixed_only_when_routed(header: &str, expected: PortValue) {
    let spec = parse_app_spec(&format!("name = \"blog\"\n{header}\n[process.web]\nport = 8080\n"))
        .unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());

    let network = job.task_groups[0].network.as_ref().unwrap();
    assert_eq!(network.ports[0].label, PORT_LABEL);
    assert_eq!(network.ports[0].value, expected);
    assert_eq!(network.ports[0].to, 8080);
    assert_eq!(job.task_groups[0].task.ports, vec![PORT_LABEL.to_string()]);
}

#[test]
fn portless_process_has_no_network_or_service() {
    let spec = parse_app_spec("name = \"blog\"\n[process.worker]\nrun = \"./work\"\n").unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());

    let group = &job.task_groups[0];
    assert!(group.network.is_none());
    assert!(group.services.is_empty());
    assert!(group.task.ports.is_empty());
}

#[test]
fn overrides_flow_into_group() {
    let spec = parse_app_spec(
        r#"
name = "blog"

[process.web]
port = 3000
scaling = { min = 3, max = 5, per_region = 2 }
resources = { cpu = 500, memory = 1024 }
drain = { signal = "SIGINT", timeout = "45s" }
health = { path = "/up", interval = "30s", timeout = "2s" }
"#,
    )
    .unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());

    let group = &job.task_groups[0];
    assert_eq!(group.count, 3);
    assert_eq!(group.max_per_region, Some(2));
    assert_eq!(group.task.resources.cpu, 500);
    assert_eq!(group.task.resources.memory_mb, 1024);
    assert_eq!(group.task.kill_signal.as_deref(), Some("SIGINT"));
    assert_eq!(group.task.kill_timeout_secs, Some(45));
    let check = group.services[0].check.as_ref().unwrap();
    assert_eq!((check.interval_secs, check.timeout_secs), (30, 2));
}

#[test]
fn process_without_run_uses_image_default() {
    let spec = parse_app_spec("name = \"blog\"\n[process.web]\nport = 80\n").unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());
    assert!(job.task_groups[0].task.command.is_none());
    assert!(job.task_groups[0].services[0].check.is_none());
}

#[test]
fn only_scheduled_processes_yield_empty_service_job() {
    let spec = parse_app_spec(
        "name = \"blog\"\n[process.nightly]\nrun = \"./n\"\nschedule = \"0 3 * * *\"\n",
    )
    .unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());
    assert!(job.task_groups.is_empty());
}

#[test]
fn function_process_gets_a_task_group() {
    let spec = parse_app_spec(
        "name = \"blog\"\n[process.thumb]\nrun = \"./thumb\"\nfunction = { timeout = \"30s\" }\n",
    )
    .unwrap();
    let job = translate(&spec, "blog:latest", &BTreeMap::new(), &dcs());
    assert_eq!(job.task_groups.len(), 1);
    assert_eq!(job.task_groups[0].name, "thumb");
}

#[test]
fn zero_minimum_still_places_one_instance() {
    let spec = parse_app_spec(
        r#"
name = "blog"

[process.web]
port = 8080
scaling = { min = 0, max = 2 }
"#,
    )
    .unwrap();

    let job = translate(&spec, "blog:abc", &env(), &dcs());
    assert_eq!(job.group("web").map(|g| g.count), Some(1));
}
