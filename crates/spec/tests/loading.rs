// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading spec files from disk across TOML, JSON, and HCL.

#![allow(clippy::unwrap_used, clippy::panic)]

use keel_spec::{discover_apps, load_app_spec, LoadError, ProcessMode};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TOML_SPEC: &str = r#"
name = "blog"
deploy = true
endpoints = ["blog.example.com"]

[process.web]
port = 8080

[process.cleanup]
schedule = "0 3 * * *"
run = "./cleanup"
"#;

const JSON_SPEC: &str = r#"{
  "name": "api",
  "processes": { "web": { "port": 9000 } }
}"#;

const HCL_SPEC: &str = r#"
name = "jobs"

process "worker" {
  run = "./work"
  function {
    timeout = "30s"
  }
}
"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn format_follows_extension() {
    let tmp = TempDir::new().unwrap();

    let blog = load_app_spec(&write(tmp.path(), "blog.toml", TOML_SPEC)).unwrap();
    assert_eq!(blog.endpoints[0].process, "web");
    assert_eq!(blog.scheduled().count(), 1);

    let api = load_app_spec(&write(tmp.path(), "api.json", JSON_SPEC)).unwrap();
    assert_eq!(api.process("web").map(|p| p.port), Some(9000));

    let jobs = load_app_spec(&write(tmp.path(), "jobs.hcl", HCL_SPEC)).unwrap();
    assert_eq!(
        jobs.process("worker").map(|p| p.mode()),
        Some(ProcessMode::Function)
    );
}

#[test]
fn root_is_the_spec_directory() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "apps/blog/keel.toml", TOML_SPEC);

    let spec = load_app_spec(&path).unwrap();

    assert_eq!(spec.root, tmp.path().join("apps/blog"));
}

#[test]
fn load_errors_carry_the_path() {
    let tmp = TempDir::new().unwrap();

    let missing = tmp.path().join("missing.toml");
    let err = load_app_spec(&missing).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("missing.toml"));

    let yaml = write(tmp.path(), "blog.yaml", "name: blog");
    assert!(matches!(
        load_app_spec(&yaml).unwrap_err(),
        LoadError::UnknownFormat(_)
    ));

    let bad = write(tmp.path(), "bad.toml", "name = \"Bad Name\"\n[process.web]\n");
    let err = load_app_spec(&bad).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn discovery_mixes_formats_and_nesting() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "blog/keel.toml", TOML_SPEC);
    write(
        tmp.path(),
        "api.json",
        &JSON_SPEC.replace("\"name\": \"api\",", "\"name\": \"api\", \"deploy\": true,"),
    );
    write(tmp.path(), "jobs.hcl", HCL_SPEC);
    write(tmp.path(), "README.md", "# not a spec");

    let discovery = discover_apps(tmp.path()).unwrap();

    let names: Vec<&str> = discovery
        .apps
        .iter()
        .map(|a| a.spec.name.as_str())
        .collect();
    assert_eq!(names, vec!["api", "blog"]);
    assert!(discovery.skipped.is_empty());
}
