// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request and one response. Deploys and
//! rollbacks reply as soon as the pipeline is launched; clients follow
//! progress through the saga log.

mod pipelines;
mod query;

use std::sync::Arc;
use std::time::Instant;

use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, SchedulerAdapter, SecretsAdapter, ToolchainAdapter,
};
use keel_core::Clock;
use keel_engine::Engine;
use keel_storage::Store;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

/// Shared handles every request handler sees
pub struct ListenCtx<S, K, R, T, P, C> {
    pub engine: Engine<S, K, R, T, P, Store, C>,
    /// Same store the engine writes to, for daemon-level queries
    pub store: Store,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

impl<S, K, R, T, P, C> Clone for ListenCtx<S, K, R, T, P, C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            store: self.store.clone(),
            start_time: self.start_time,
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

/// Listener task for accepting socket connections.
pub struct Listener<S, K, R, T, P, C> {
    socket: UnixListener,
    ctx: ListenCtx<S, K, R, T, P, C>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<S, K, R, T, P, C> Listener<S, K, R, T, P, C>
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    pub fn new(socket: UnixListener, ctx: ListenCtx<S, K, R, T, P, C>) -> Self {
        Self { socket, ctx }
    }

    /// Run the accept loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("connection timeout")
                                }
                                _ => error!(error = %e, "connection error"),
                            }
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

async fn handle_connection<S, K, R, T, P, C>(
    stream: UnixStream,
    ctx: &ListenCtx<S, K, R, T, P, C>,
) -> Result<(), ConnectionError>
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    let (mut reader, mut writer) = stream.into_split();
    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    // Polling clients query often
    if is_query(&request) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(ctx, request).await;
    debug!(response = ?response, "sending response");
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

fn is_query(request: &Request) -> bool {
    matches!(
        request,
        Request::Ping
            | Request::Status
            | Request::Deployments { .. }
            | Request::SagaEvents { .. }
            | Request::AppEvents { .. }
            | Request::RecentEvents { .. }
    )
}

/// Dispatch one request. Failures become [`Response::Error`].
pub(crate) async fn handle_request<S, K, R, T, P, C>(
    ctx: &ListenCtx<S, K, R, T, P, C>,
    request: Request,
) -> Response
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    C: Clock,
{
    match request {
        Request::Ping => Response::Pong,

        Request::Deploy { spec_path, git_ref } => {
            pipelines::handle_deploy(ctx, &spec_path, &git_ref)
        }
        Request::Rollback { spec_path } => pipelines::handle_rollback(ctx, &spec_path),
        Request::Stop { spec_path, purge } => {
            pipelines::handle_stop(ctx, &spec_path, purge).await
        }
        Request::Scale {
            spec_path,
            process,
            count,
        } => pipelines::handle_scale(ctx, &spec_path, &process, count).await,

        Request::Deployments { app, limit } => query::handle_deployments(ctx, &app, limit),
        Request::SagaEvents { saga_id } => query::handle_saga_events(ctx, &saga_id),
        Request::AppEvents { app, limit } => query::handle_app_events(ctx, &app, limit),
        Request::RecentEvents { limit } => query::handle_recent_events(ctx, limit),
        Request::Discover { dir } => query::handle_discover(&dir),
        Request::Status => query::handle_status(ctx),

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

fn error_response(e: impl std::fmt::Display) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "test_ctx.rs"]
mod test_ctx;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
