// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::test_support::deployment;
use keel_core::DeploymentStatus;

#[test]
fn requests_use_type_tag() {
    let json = serde_json::to_value(Request::Deploy {
        spec_path: PathBuf::from("/srv/apps/blog.toml"),
        git_ref: "v2".to_string(),
    })
    .unwrap();
    assert_eq!(json["type"], "Deploy");
    assert_eq!(json["spec_path"], "/srv/apps/blog.toml");
}

#[test]
fn limits_and_refs_default_when_omitted() {
    let req: Request = decode(br#"{"type":"Deployments","app":"blog"}"#).unwrap();
    assert_eq!(
        req,
        Request::Deployments {
            app: "blog".to_string(),
            limit: DEFAULT_LIMIT
        }
    );

    let req: Request = decode(br#"{"type":"Deploy","spec_path":"blog.toml"}"#).unwrap();
    assert_eq!(
        req,
        Request::Deploy {
            spec_path: PathBuf::from("blog.toml"),
            git_ref: String::new()
        }
    );
}

#[test]
fn deployments_response_carries_records() {
    let response = Response::Deployments {
        deployments: vec![deployment("d1", "blog", DeploymentStatus::Deployed, 1_000)],
    };
    let back: Response = decode(&encode(&response).unwrap()).unwrap();
    assert_eq!(back, response);
}

#[test]
fn unknown_request_type_is_rejected() {
    let err = decode::<Request>(br#"{"type":"Launch"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}

#[tokio::test]
async fn frame_has_big_endian_length_prefix() {
    let mut buffer = Vec::new();
    write_message(&mut buffer, b"{}").await.unwrap();
    assert_eq!(buffer, vec![0, 0, 0, 2, b'{', b'}']);

    let mut cursor = std::io::Cursor::new(buffer);
    assert_eq!(read_message(&mut cursor).await.unwrap(), b"{}");
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_prefix_is_rejected_before_reading_body() {
    let prefix = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
    let mut cursor = std::io::Cursor::new(prefix);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn request_and_response_over_a_duplex_stream() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    let body = encode(&Request::Ping).unwrap();
    write_message(&mut client, &body).await.unwrap();
    let req = read_request(&mut server, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(req, Request::Ping);

    write_response(&mut server, &Response::Pong, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    let reply: Response = decode(&read_message(&mut client).await.unwrap()).unwrap();
    assert_eq!(reply, Response::Pong);
}

#[tokio::test(start_paused = true)]
async fn silent_client_times_out() {
    let (_client, mut server) = tokio::io::duplex(64);
    let err = read_request(&mut server, DEFAULT_TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}
