// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the WebSocket remote against an in-process server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use chrono::{NaiveDate, TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use tally_core::{Activity, ActivityType, ClientMessage, ServerMessage, SyncOp};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use super::*;

fn make_op(id: &str) -> SyncOp {
    let activity = Activity::new(
        id,
        "user-1",
        ActivityType::Expense,
        12.5,
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
    )
    .unwrap();
    SyncOp::add(activity)
}

/// Starts a server that accepts one connection and answers every
/// submission with the reply produced by `reply_for`.
async fn scripted_server<F>(reply_for: F) -> String
where
    F: Fn(&str) -> ServerMessage + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let msg = ClientMessage::from_json(text.as_str()).unwrap();
            if let ClientMessage::Submit(op) = msg {
                let reply = reply_for(&op.activity_id);
                ws.send(Message::Text(reply.to_json().unwrap().into()))
                    .await
                    .unwrap();
            }
        }
    });

    format!("ws://{addr}")
}

#[tokio::test]
async fn test_submit_acked() {
    let url = scripted_server(|id| ServerMessage::ack(id)).await;
    let remote = WebSocketRemote::new(url);

    remote.submit(make_op("act-1")).await.unwrap();
}

#[tokio::test]
async fn test_connection_is_reused_across_submits() {
    let url = scripted_server(|id| ServerMessage::ack(id)).await;
    let remote = WebSocketRemote::new(url);

    // Server only accepts once, so both submits share the connection.
    remote.submit(make_op("act-1")).await.unwrap();
    remote.submit(make_op("act-2")).await.unwrap();
}

#[tokio::test]
async fn test_conflict_reply_surfaces_remote_timestamp() {
    let remote_ts = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();
    let url = scripted_server(move |id| ServerMessage::conflict(id, remote_ts)).await;
    let remote = WebSocketRemote::new(url);

    match remote.submit(make_op("act-1")).await {
        Err(RemoteError::Conflict { remote_timestamp }) => {
            assert_eq!(remote_timestamp, remote_ts);
        }
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_reply_is_transient() {
    let url = scripted_server(|id| ServerMessage::rejected(id, "schema mismatch")).await;
    let remote = WebSocketRemote::new(url);

    match remote.submit(make_op("act-1")).await {
        Err(RemoteError::Transient(reason)) => assert!(reason.contains("schema mismatch")),
        other => panic!("expected transient, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_failure_is_transient() {
    // Bind then drop so the port is known-dead.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = WebSocketRemote::new(format!("ws://{addr}"));
    assert!(matches!(
        remote.submit(make_op("act-1")).await,
        Err(RemoteError::Transient(_))
    ));
}

#[tokio::test]
async fn test_unrelated_messages_are_skipped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        // Noise first, then the verdict.
        ws.send(Message::Text(
            ServerMessage::pong(1).to_json().unwrap().into(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text(
            ServerMessage::ack("act-1").to_json().unwrap().into(),
        ))
        .await
        .unwrap();
    });

    let remote = WebSocketRemote::new(format!("ws://{addr}"));
    remote.submit(make_op("act-1")).await.unwrap();
}
