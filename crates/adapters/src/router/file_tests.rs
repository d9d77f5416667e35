// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn router(tmp: &TempDir, reload: Option<&str>) -> FileEdgeRouter {
    FileEdgeRouter::new(
        tmp.path().join("routes").join("routes.json"),
        reload.map(str::to_string),
    )
}

#[tokio::test]
async fn add_route_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let router = router(&tmp, None);

    assert!(router
        .add_route("blog.example.com", "http://10.0.0.5:8080")
        .await
        .unwrap());
    assert!(!router
        .add_route("blog.example.com", "http://10.0.0.5:8080")
        .await
        .unwrap());
    assert!(router
        .add_route("blog.example.com", "http://10.0.0.6:8080")
        .await
        .unwrap());

    let routes = router.routes().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes["blog.example.com"], "http://10.0.0.6:8080");
}

#[tokio::test]
async fn remove_route_reports_change() {
    let tmp = TempDir::new().unwrap();
    let router = router(&tmp, None);
    router
        .add_route("blog.example.com", "http://10.0.0.5:8080")
        .await
        .unwrap();

    assert!(router.remove_route("blog.example.com").await.unwrap());
    assert!(!router.remove_route("blog.example.com").await.unwrap());
    assert!(router.routes().unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_table_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let router = router(&tmp, None);
    std::fs::create_dir_all(tmp.path().join("routes")).unwrap();
    std::fs::write(tmp.path().join("routes").join("routes.json"), "{not json").unwrap();
    assert!(router.add_route("a.example.com", "http://x").await.is_err());
}

#[tokio::test]
async fn apply_runs_reload_command() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("reloaded");
    let command = format!("touch {}", marker.display());
    let router = router(&tmp, Some(&command));
    router.apply().await.unwrap();
    assert!(marker.exists());
}

#[tokio::test]
async fn apply_without_command_is_noop() {
    let tmp = TempDir::new().unwrap();
    router(&tmp, None).apply().await.unwrap();
}

#[tokio::test]
async fn failing_reload_is_reported() {
    let tmp = TempDir::new().unwrap();
    let router = router(&tmp, Some("echo nope >&2; exit 1"));
    let err = router.apply().await.unwrap_err();
    assert!(err.to_string().contains("nope"));
}
