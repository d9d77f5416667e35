// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_spec::parse_app_spec;

#[test]
fn status_mapping_follows_lifecycle_order() {
    let statuses: Vec<DeploymentStatus> = DEPLOY_STEPS
        .iter()
        .filter_map(|s| s.entry_status())
        .collect();
    assert_eq!(
        statuses,
        vec![
            DeploymentStatus::Building,
            DeploymentStatus::Building,
            DeploymentStatus::Testing,
            DeploymentStatus::Migrating,
            DeploymentStatus::Migrating,
            DeploymentStatus::Submitting,
            DeploymentStatus::Submitting,
        ]
    );
    assert_eq!(Step::Healthy.exit_status(), Some(DeploymentStatus::Healthy));
    assert_eq!(Step::Submit.exit_status(), None);
}

#[test]
fn step_names() {
    let names: Vec<String> = DEPLOY_STEPS.iter().map(Step::to_string).collect();
    assert_eq!(
        names,
        vec!["clone", "build", "test", "snapshot", "migrate", "submit", "healthy", "forge", "cleanup"]
    );
    let rollback: Vec<&str> = ROLLBACK_STEPS.iter().map(|s| s.name()).collect();
    assert_eq!(rollback, vec!["submit", "healthy"]);
}

#[test]
fn short_sha_truncates_to_twelve() {
    let spec = parse_app_spec("name = \"blog\"\n[process.web]\nport = 80\n").unwrap();
    let mut ctx = PipelineContext::new(
        spec,
        SagaCategory::Deploy,
        DeploymentId::new("d1"),
        SagaId::new("s1"),
        "main",
        PathBuf::from("/tmp/w"),
    );
    ctx.commit_sha = "0123456789abcdef0123".to_string();
    assert_eq!(ctx.short_sha(), "0123456789ab");
    assert_eq!(ctx.app(), "blog");
    assert_eq!(ctx.status, DeploymentStatus::Queued);
}
