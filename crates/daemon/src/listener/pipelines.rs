// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers that change the cluster.

use std::path::Path;

use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SecretsAdapter, ToolchainAdapter,
};
use keel_core::{Clock, SagaSource};
use keel_engine::PipelineRun;
use keel_spec::{load_app_spec, AppSpec};
use tracing::warn;

use super::{error_response, ListenCtx};
use crate::protocol::Response;

pub(super) fn handle_deploy<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    spec_path: &Path,
    git_ref: &str,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    let spec = match load(spec_path) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    started(ctx.engine.deploy(spec, git_ref, SagaSource::Api))
}

pub(super) fn handle_rollback<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    spec_path: &Path,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    let spec = match load(spec_path) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    started(ctx.engine.rollback(spec, SagaSource::Api))
}

pub(super) async fn handle_stop<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    spec_path: &Path,
    purge: bool,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    let spec = match load(spec_path) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    match ctx.engine.stop(&spec, purge).await {
        Ok(()) => Response::Ok,
        Err(e) => error_response(e),
    }
}

pub(super) async fn handle_scale<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    spec_path: &Path,
    process: &str,
    count: u32,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    let spec = match load(spec_path) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    match ctx.engine.scale(&spec, process, count).await {
        Ok(()) => Response::Ok,
        Err(e) => error_response(e),
    }
}

fn load(spec_path: &Path) -> Result<AppSpec, Response> {
    load_app_spec(spec_path).map_err(|e| {
        warn!(path = %spec_path.display(), error = %e, "failed to load spec");
        error_response(e)
    })
}

/// The pipeline keeps running after the reply; its handle is dropped.
fn started(run: Result<PipelineRun, keel_engine::PipelineError>) -> Response {
    match run {
        Ok(run) => Response::Started {
            saga_id: run.saga_id,
            deployment_id: run.deployment_id,
        },
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
#[path = "pipelines_tests.rs"]
mod tests;
