// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-server communication.
//!
//! The protocol is small:
//! - Client submits pending operations, one at a time.
//! - Server answers each submission with an Ack, a Conflict (its copy
//!   is newer than the submitted snapshot), or a rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::op::SyncOp;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a pending operation for remote commit.
    Submit(SyncOp),

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The submitted operation was committed.
    Ack {
        /// Activity the committed operation targeted.
        activity_id: String,
    },

    /// The server holds a newer record than the submitted snapshot.
    ///
    /// The client should refresh its snapshot and resubmit;
    /// last-writer-wins by timestamp decides the survivor.
    Conflict {
        /// Activity the rejected operation targeted.
        activity_id: String,
        /// Timestamp of the server's current copy.
        remote_timestamp: DateTime<Utc>,
    },

    /// The submission was refused for a non-conflict reason.
    Rejected {
        /// Activity the refused operation targeted.
        activity_id: String,
        /// Human-readable refusal reason.
        message: String,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error message unrelated to a specific submission.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Submit message.
    pub fn submit(op: SyncOp) -> Self {
        ClientMessage::Submit(op)
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(activity_id: impl Into<String>) -> Self {
        ServerMessage::Ack {
            activity_id: activity_id.into(),
        }
    }

    /// Creates a Conflict message.
    pub fn conflict(activity_id: impl Into<String>, remote_timestamp: DateTime<Utc>) -> Self {
        ServerMessage::Conflict {
            activity_id: activity_id.into(),
            remote_timestamp,
        }
    }

    /// Creates a Rejected message.
    pub fn rejected(activity_id: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            activity_id: activity_id.into(),
            message: message.into(),
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
