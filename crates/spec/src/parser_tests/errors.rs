// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors.

use super::{assert_hcl_err, assert_toml_err};

#[yare::parameterized(
    uppercase  = { "Blog" },
    underscore = { "my_app" },
    leading    = { "-blog" },
    trailing   = { "blog-" },
    empty      = { "" },
)]
fn invalid_app_names(name: &str) {
    let input = format!("name = \"{}\"\n[process.web]\nport = 80\n", name);
    assert_toml_err(&input, &["invalid format for name"]);
}

#[test]
fn missing_processes() {
    assert_toml_err("name = \"blog\"\n", &["at least one process is required"]);
}

#[test]
fn invalid_process_name() {
    assert_toml_err(
        "name = \"blog\"\n[process.Web]\nport = 80\n",
        &["process.Web", "lowercase"],
    );
}

#[test]
fn schedule_and_function_are_exclusive() {
    assert_toml_err(
        r#"
name = "blog"
[process.report]
schedule = "0 * * * *"
function = {}
"#,
        &["process.report", "mutually exclusive"],
    );
}

#[test]
fn scheduled_process_cannot_listen() {
    assert_toml_err(
        r#"
name = "blog"
[process.report]
port = 8080
schedule = "0 * * * *"
"#,
        &["scheduled process must not declare a port"],
    );
}

#[yare::parameterized(
    four_fields = { "* * * *" },
    six_fields  = { "0 * * * * *" },
    bad_char    = { "0 * * * $" },
)]
fn invalid_cron(expr: &str) {
    let input = format!(
        "name = \"blog\"\n[process.report]\nschedule = \"{}\"\n",
        expr
    );
    assert_toml_err(&input, &["process.report.schedule"]);
}

#[test]
fn scaling_max_below_min() {
    assert_toml_err(
        r#"
name = "blog"
[process.web]
port = 80
scaling = { min = 3, max = 2 }
"#,
        &["process.web.scaling", "max (2)", "min (3)"],
    );
}

#[test]
fn invalid_health_interval() {
    assert_toml_err(
        r#"
name = "blog"
[process.web]
port = 80
health = { path = "/health", interval = "soon" }
"#,
        &["process.web.health.interval"],
    );
}

#[test]
fn health_path_must_be_absolute() {
    assert_toml_err(
        r#"
name = "blog"
[process.web]
port = 80
health = { path = "health" }
"#,
        &["process.web.health.path"],
    );
}

#[test]
fn invalid_drain_timeout_in_hcl() {
    assert_hcl_err(
        r#"
name = "blog"
process "web" {
  port = 80
  drain {
    timeout = "10 parsecs"
  }
}
"#,
        &["process.web.drain.timeout"],
    );
}

#[test]
fn empty_postgres_database() {
    assert_toml_err(
        r#"
name = "blog"
[dependencies.postgres]
database = ""
[process.web]
port = 80
"#,
        &["dependencies.postgres.database"],
    );
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert_toml_err("name = ", &["TOML parse error"]);
}
