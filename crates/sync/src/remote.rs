// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote authoritative store.
//!
//! [`RemoteStore`] is the engine's only view of the server. The
//! production implementation speaks the tagged-JSON protocol over a
//! WebSocket; tests substitute scripted fakes.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tally_core::{ClientMessage, ServerMessage, SyncOp};

/// Why a submission did not commit.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or server trouble. The operation stays queued and is
    /// retried with backoff.
    #[error("transient remote failure: {0}")]
    Transient(String),

    /// The remote holds a version of the record written at the given
    /// time. The caller decides who wins.
    #[error("remote record is newer (written {remote_timestamp})")]
    Conflict { remote_timestamp: DateTime<Utc> },
}

/// Submission endpoint for queued operations.
pub trait RemoteStore: Send + Sync {
    /// Submit one operation and wait for the server's verdict.
    fn submit(
        &self,
        op: SyncOp,
    ) -> Pin<Box<dyn Future<Output = Result<(), RemoteError>> + Send + '_>>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`RemoteStore`] over a WebSocket connection.
///
/// The connection is established lazily on first submit and reused
/// afterwards. Any transport error drops the connection so the next
/// submit reconnects from scratch.
pub struct WebSocketRemote {
    url: String,
    conn: tokio::sync::Mutex<Option<WsStream>>,
}

impl WebSocketRemote {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: tokio::sync::Mutex::new(None),
        }
    }

    async fn submit_inner(&self, op: SyncOp) -> Result<(), RemoteError> {
        let mut guard = self.conn.lock().await;

        if guard.is_none() {
            tracing::debug!(url = %self.url, "connecting to remote");
            let (ws, _response) = connect_async(self.url.as_str())
                .await
                .map_err(|err| RemoteError::Transient(format!("connect failed: {err}")))?;
            *guard = Some(ws);
        }
        let ws = match guard.as_mut() {
            Some(ws) => ws,
            None => return Err(RemoteError::Transient("no connection".into())),
        };

        let json = ClientMessage::submit(op.clone())
            .to_json()
            .map_err(|err| RemoteError::Transient(format!("encode failed: {err}")))?;
        if let Err(err) = ws.send(Message::Text(json.into())).await {
            *guard = None;
            return Err(RemoteError::Transient(format!("send failed: {err}")));
        }

        // Wait for the verdict on this activity, skipping keepalives
        // and anything unrelated.
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let msg = match ServerMessage::from_json(text.as_str()) {
                        Ok(msg) => msg,
                        Err(err) => {
                            tracing::warn!(error = %err, "unparseable server message, skipping");
                            continue;
                        }
                    };
                    match msg {
                        ServerMessage::Ack { activity_id } if activity_id == op.activity_id => {
                            return Ok(());
                        }
                        ServerMessage::Conflict {
                            activity_id,
                            remote_timestamp,
                        } if activity_id == op.activity_id => {
                            return Err(RemoteError::Conflict { remote_timestamp });
                        }
                        ServerMessage::Rejected {
                            activity_id,
                            message,
                        } if activity_id == op.activity_id => {
                            return Err(RemoteError::Transient(format!("rejected: {message}")));
                        }
                        ServerMessage::Error { message } => {
                            return Err(RemoteError::Transient(format!("server error: {message}")));
                        }
                        _ => {}
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    *guard = None;
                    return Err(RemoteError::Transient("connection closed".into()));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    *guard = None;
                    return Err(RemoteError::Transient(format!("receive failed: {err}")));
                }
            }
        }
    }
}

impl RemoteStore for WebSocketRemote {
    fn submit(
        &self,
        op: SyncOp,
    ) -> Pin<Box<dyn Future<Output = Result<(), RemoteError>> + Send + '_>> {
        Box::pin(self.submit_inner(op))
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
