// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::test_ctx::harness;
use super::*;
use crate::protocol::{read_message, write_message, decode, encode};
use std::time::Duration;

#[tokio::test]
async fn ping_pongs() {
    let h = harness();
    assert_eq!(handle_request(&h.ctx, Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn shutdown_notifies() {
    let h = harness();
    let notified = h.ctx.shutdown.clone();
    let waiter = tokio::spawn(async move { notified.notified().await });

    let response = handle_request(&h.ctx, Request::Shutdown).await;

    assert_eq!(response, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
}

#[yare::parameterized(
    ping       = { Request::Ping, true },
    status     = { Request::Status, true },
    recent     = { Request::RecentEvents { limit: 5 }, true },
    shutdown   = { Request::Shutdown, false },
    rollback   = { Request::Rollback { spec_path: "a.toml".into() }, false },
)]
fn query_classification(request: Request, expected: bool) {
    assert_eq!(is_query(&request), expected);
}

#[tokio::test]
async fn serves_requests_over_socket() {
    let h = harness();
    let socket_path = h.dir.path().join("test.sock");
    let socket = UnixListener::bind(&socket_path).unwrap();
    tokio::spawn(Listener::new(socket, h.ctx.clone()).run());

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    write_message(&mut stream, &encode(&Request::Ping).unwrap())
        .await
        .unwrap();
    let body = read_message(&mut stream).await.unwrap();
    let response: Response = decode(&body).unwrap();

    assert_eq!(response, Response::Pong);
}
