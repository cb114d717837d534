// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process operation queue with per-activity coalescing.
//!
//! The queue holds at most one pending operation per activity id.
//! Insertion order is intent order: a coalesced op keeps the position
//! of the op it replaced, so unrelated activities drain in the order
//! they were first touched.
//!
//! Coalescing rules:
//! - No pending op for the id: append at the end.
//! - Pending op exists: replace it in place with the newer op.
//! - A Delete replaces any prior pending op for the id.
//! - Anything following a still-pending Delete is rejected: an
//!   activity already marked for deletion cannot be resurrected in
//!   the same session.
//!
//! The queue is owned exclusively by the sync engine; nothing else
//! mutates it.

use crate::op::{OpKind, SyncOp};

/// Result of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// No pending op existed; the op was appended at the tail.
    Appended,
    /// A pending op for the same activity was replaced in place.
    Coalesced,
    /// A Delete is already pending for the activity; the op was
    /// refused and the queue is unchanged.
    Rejected,
}

/// Ordered, deduplicated queue of pending sync operations.
#[derive(Debug, Default)]
pub struct OpQueue {
    entries: Vec<SyncOp>,
}

impl OpQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        OpQueue { entries: Vec::new() }
    }

    /// Adds an operation, coalescing with any pending op for the
    /// same activity id.
    pub fn enqueue(&mut self, op: SyncOp) -> EnqueueOutcome {
        match self.position(&op.activity_id) {
            None => {
                self.entries.push(op);
                EnqueueOutcome::Appended
            }
            Some(idx) => {
                if self.entries[idx].kind == OpKind::Delete {
                    return EnqueueOutcome::Rejected;
                }
                self.entries[idx] = op;
                EnqueueOutcome::Coalesced
            }
        }
    }

    /// Removes and returns the pending op for the given activity id.
    ///
    /// Idempotent: returns `None` when no op is pending.
    pub fn dequeue(&mut self, activity_id: &str) -> Option<SyncOp> {
        self.position(activity_id)
            .map(|idx| self.entries.remove(idx))
    }

    /// Returns the pending op for the given activity id, if any.
    pub fn get(&self, activity_id: &str) -> Option<&SyncOp> {
        self.position(activity_id).map(|idx| &self.entries[idx])
    }

    /// Returns all pending ops in arrival order.
    pub fn peek_in_order(&self) -> Vec<SyncOp> {
        self.entries.clone()
    }

    /// Returns the first pending op whose activity id satisfies the
    /// predicate, preserving arrival order.
    pub fn first_matching(&self, mut pred: impl FnMut(&str) -> bool) -> Option<SyncOp> {
        self.entries
            .iter()
            .find(|op| pred(&op.activity_id))
            .cloned()
    }

    /// Checks whether the queue holds no pending operations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of pending operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, activity_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|op| op.activity_id == activity_id)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
