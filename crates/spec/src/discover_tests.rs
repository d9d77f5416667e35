// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::TempDir;

const DEPLOYABLE: &str = r#"
name = "blog"
deploy = true

[process.web]
port = 8080
"#;

const NOT_DEPLOYABLE: &str = r#"
name = "draft"

[process.web]
port = 8080
"#;

#[test]
fn returns_only_deploy_flagged_specs() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blog.toml"), DEPLOYABLE).unwrap();
    fs::write(tmp.path().join("draft.toml"), NOT_DEPLOYABLE).unwrap();

    let found = discover_apps(tmp.path()).unwrap();
    assert_eq!(found.apps.len(), 1);
    assert_eq!(found.apps[0].spec.name, "blog");
    assert_eq!(found.apps[0].spec.root, tmp.path());
    assert!(found.skipped.is_empty());
}

#[test]
fn finds_nested_keel_files_one_level_down() {
    let tmp = TempDir::new().unwrap();
    let app_dir = tmp.path().join("blog");
    fs::create_dir(&app_dir).unwrap();
    fs::write(app_dir.join("keel.toml"), DEPLOYABLE).unwrap();
    // Other files in nested dirs are ignored
    fs::write(app_dir.join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
    let deeper = app_dir.join("deeper");
    fs::create_dir(&deeper).unwrap();
    fs::write(deeper.join("keel.toml"), DEPLOYABLE).unwrap();

    let found = discover_apps(tmp.path()).unwrap();
    assert_eq!(found.apps.len(), 1);
    assert_eq!(found.apps[0].path, app_dir.join("keel.toml"));
    assert_eq!(found.apps[0].spec.root, app_dir);
}

#[test]
fn invalid_specs_are_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blog.toml"), DEPLOYABLE).unwrap();
    fs::write(tmp.path().join("broken.toml"), "name = ").unwrap();
    fs::write(tmp.path().join("README.md"), "# not a spec").unwrap();

    let found = discover_apps(tmp.path()).unwrap();
    assert_eq!(found.apps.len(), 1);
    assert_eq!(found.skipped.len(), 1);
    assert_eq!(found.skipped[0].0, tmp.path().join("broken.toml"));
}

#[test]
fn missing_directory_is_empty() {
    let tmp = TempDir::new().unwrap();
    let found = discover_apps(&tmp.path().join("nope")).unwrap();
    assert!(found.apps.is_empty());
    assert!(found.skipped.is_empty());
}

#[test]
fn results_are_sorted_by_path() {
    let tmp = TempDir::new().unwrap();
    for name in ["zeta", "alpha", "mid"] {
        let content = DEPLOYABLE.replace("blog", name);
        fs::write(tmp.path().join(format!("{}.toml", name)), content).unwrap();
    }
    let found = discover_apps(tmp.path()).unwrap();
    let names: Vec<&str> = found.apps.iter().map(|a| a.spec.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}
