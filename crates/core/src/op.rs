// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending sync operations.
//!
//! Every local mutation that still awaits remote confirmation is
//! represented as a [`SyncOp`]: the kind of mutation, a snapshot of
//! the record as it stood when the mutation was issued, and the
//! moment it entered the queue. Ops are serializable so they can be
//! carried over the wire protocol unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::activity::Activity;

/// The kind of mutation a sync operation performs remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Create the activity on the remote store.
    Add,
    /// Overwrite the remote copy with the snapshot.
    Update,
    /// Remove the activity from the remote store.
    Delete,
}

impl OpKind {
    /// Returns the string representation used in logs and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A queued mutation awaiting remote confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOp {
    /// The activity this operation targets.
    pub activity_id: String,
    /// What the operation does remotely.
    pub kind: OpKind,
    /// Snapshot of the record at mutation time. `None` for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Activity>,
    /// When the operation entered the queue.
    pub enqueued_at: DateTime<Utc>,
}

impl SyncOp {
    /// Creates an Add operation from a freshly persisted activity.
    pub fn add(activity: Activity) -> Self {
        SyncOp {
            activity_id: activity.id.clone(),
            kind: OpKind::Add,
            snapshot: Some(activity),
            enqueued_at: Utc::now(),
        }
    }

    /// Creates an Update operation from the latest local state.
    pub fn update(activity: Activity) -> Self {
        SyncOp {
            activity_id: activity.id.clone(),
            kind: OpKind::Update,
            snapshot: Some(activity),
            enqueued_at: Utc::now(),
        }
    }

    /// Creates a Delete operation. Deletes carry no snapshot.
    pub fn delete(activity_id: impl Into<String>) -> Self {
        SyncOp {
            activity_id: activity_id.into(),
            kind: OpKind::Delete,
            snapshot: None,
            enqueued_at: Utc::now(),
        }
    }

    /// The instant used for last-writer-wins conflict ordering.
    ///
    /// Snapshot-carrying ops use the record's own timestamp; deletes
    /// fall back to their enqueue time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.snapshot
            .as_ref()
            .map(|a| a.timestamp)
            .unwrap_or(self.enqueued_at)
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
