// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query handlers.

use std::path::Path;

use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SecretsAdapter, ToolchainAdapter,
};
use keel_core::{Clock, SagaId};
use keel_spec::discover_apps;

use super::{error_response, ListenCtx};
use crate::protocol::{DiscoveredSpec, Response, SkippedSpec, PROTOCOL_VERSION};

pub(super) fn handle_deployments<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    app: &str,
    limit: usize,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    match ctx.engine.history(app, limit) {
        Ok(deployments) => Response::Deployments { deployments },
        Err(e) => error_response(e),
    }
}

pub(super) fn handle_saga_events<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    saga_id: &SagaId,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    match ctx.engine.saga_events(saga_id) {
        Ok(events) => Response::Events { events },
        Err(e) => error_response(e),
    }
}

pub(super) fn handle_app_events<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    app: &str,
    limit: usize,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    match ctx.engine.app_events(app, limit) {
        Ok(events) => Response::Events { events },
        Err(e) => error_response(e),
    }
}

pub(super) fn handle_recent_events<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    limit: usize,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    match ctx.engine.recent_events(limit) {
        Ok(events) => Response::Events { events },
        Err(e) => error_response(e),
    }
}

pub(super) fn handle_discover(dir: &Path) -> Response {
    match discover_apps(dir) {
        Ok(discovery) => Response::Discovered {
            apps: discovery
                .apps
                .into_iter()
                .map(|app| DiscoveredSpec {
                    app: app.spec.name,
                    path: app.path,
                })
                .collect(),
            skipped: discovery
                .skipped
                .into_iter()
                .map(|(path, error)| SkippedSpec { path, error })
                .collect(),
        },
        Err(e) => error_response(format!("cannot scan {}: {}", dir.display(), e)),
    }
}

pub(super) fn handle_status<S, K, R, T, P, C>(ctx: &ListenCtx<S, K, R, T, P, C>) -> Response {
    Response::Status {
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        version: PROTOCOL_VERSION.to_string(),
        in_flight: ctx.store.state().in_flight().count(),
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
