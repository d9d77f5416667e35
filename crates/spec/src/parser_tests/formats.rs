// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-format parsing tests: TOML, JSON, and HCL.

use crate::{parse_app_spec, parse_app_spec_with_format, AppSpec, Format, ProcessMode};
use std::time::Duration;

/// Shared assertions for the "blog" sample spec across all three formats.
fn assert_sample_blog_spec(spec: &AppSpec) {
    assert_eq!(spec.name, "blog");
    assert!(spec.deploy);

    // Processes keep declaration order
    let names: Vec<&str> = spec.processes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["web", "cleanup"]);

    let web = &spec.processes["web"];
    assert_eq!(web.name, "web");
    assert_eq!(web.port, 8080);
    assert_eq!(web.command(), Some("./server"));
    assert_eq!(web.mode(), ProcessMode::LongRunning);
    assert_eq!(web.scaling.min, 2);
    assert_eq!(web.scaling.max(), 4);
    let health = web.health.as_ref().unwrap();
    assert_eq!(health.path, "/health");
    assert_eq!(health.interval(), Duration::from_secs(15));

    let cleanup = &spec.processes["cleanup"];
    assert_eq!(cleanup.mode(), ProcessMode::Scheduled);
    assert_eq!(cleanup.schedule, "*/5 * * * *");

    assert_eq!(spec.endpoints.len(), 1);
    assert_eq!(spec.endpoints[0].host, "blog.example.com");
    assert_eq!(spec.endpoints[0].process, "web");

    assert_eq!(spec.env.get("RUST_LOG").map(String::as_str), Some("info"));
    assert_eq!(spec.secrets, vec!["DATABASE_URL"]);
    assert_eq!(spec.relational_database(), Some("blog"));
    assert_eq!(spec.migrate_command(), Some("./migrate up"));
    assert_eq!(spec.build.as_ref().map(|b| b.dockerfile.as_str()), Some("Dockerfile"));
}

// ============================================================================
// TOML Format
// ============================================================================

const SAMPLE_TOML: &str = r#"
name = "blog"
deploy = true
endpoints = ["blog.example.com"]
secrets = ["DATABASE_URL"]

[env]
RUST_LOG = "info"

[build]

[migrate]
command = "./migrate up"

[dependencies.postgres]
database = "blog"

[process.web]
port = 8080
run = "./server"
health = { path = "/health", interval = "15s" }
scaling = { min = 2, max = 4 }

[process.cleanup]
run = "./cleanup"
schedule = "*/5 * * * *"
"#;

#[test]
fn parse_toml_sample() {
    let spec = parse_app_spec(SAMPLE_TOML).unwrap();
    assert_sample_blog_spec(&spec);
}

// ============================================================================
// JSON Format
// ============================================================================

const SAMPLE_JSON: &str = r#"
{
  "name": "blog",
  "deploy": true,
  "endpoints": ["blog.example.com"],
  "secrets": ["DATABASE_URL"],
  "env": { "RUST_LOG": "info" },
  "build": {},
  "migrate": { "command": "./migrate up" },
  "dependencies": { "postgres": { "database": "blog" } },
  "processes": {
    "web": {
      "port": 8080,
      "run": "./server",
      "health": { "path": "/health", "interval": "15s" },
      "scaling": { "min": 2, "max": 4 }
    },
    "cleanup": {
      "run": "./cleanup",
      "schedule": "*/5 * * * *"
    }
  }
}
"#;

#[test]
fn parse_json_sample() {
    let spec = parse_app_spec_with_format(SAMPLE_JSON, Format::Json).unwrap();
    assert_sample_blog_spec(&spec);
}

// ============================================================================
// HCL Format
// ============================================================================

const SAMPLE_HCL: &str = r#"
name      = "blog"
deploy    = true
endpoints = ["blog.example.com"]
secrets   = ["DATABASE_URL"]

env = {
  RUST_LOG = "info"
}

build {}

migrate {
  command = "./migrate up"
}

dependencies {
  postgres {
    database = "blog"
  }
}

process "web" {
  port = 8080
  run  = "./server"

  health {
    path     = "/health"
    interval = "15s"
  }

  scaling {
    min = 2
    max = 4
  }
}

process "cleanup" {
  run      = "./cleanup"
  schedule = "*/5 * * * *"
}
"#;

#[test]
fn parse_hcl_sample() {
    let spec = parse_app_spec_with_format(SAMPLE_HCL, Format::Hcl).unwrap();
    assert_sample_blog_spec(&spec);
}

#[yare::parameterized(
    toml = { "keel.toml", Some(Format::Toml) },
    hcl  = { "keel.hcl",  Some(Format::Hcl) },
    json = { "app.json",  Some(Format::Json) },
    yaml = { "app.yaml",  None },
    none = { "Makefile",  None },
)]
fn format_for_path(name: &str, expected: Option<Format>) {
    assert_eq!(Format::for_path(std::path::Path::new(name)), expected);
}
