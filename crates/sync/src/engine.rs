// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine: local-first mutations with a background drain.
//!
//! Mutations write to the local store first, then enqueue an operation
//! for the remote. A single background task owns all remote traffic,
//! so drains are single-flight by construction. It wakes on:
//! - a mutation while connected,
//! - a connectivity-restored event,
//! - a periodic interval, as a safety net.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use tally_core::{Activity, EnqueueOutcome, OpKind, OpQueue, SyncOp};

use crate::config::SyncConfig;
use crate::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::error::{Error, Result};
use crate::remote::{RemoteError, RemoteStore};
use crate::store::LocalStore;

const STATE_UNINITIALIZED: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_DISPOSED: u8 = 2;

/// Offline-first synchronization engine.
///
/// Lifecycle: [`SyncEngine::new`] then [`SyncEngine::initialize`]
/// before any mutation; [`SyncEngine::dispose`] when done. Mutations
/// on a disposed engine are silent no-ops reporting `false`.
pub struct SyncEngine {
    inner: Arc<EngineInner>,
    monitor: Mutex<Option<Box<dyn ConnectivityMonitor>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct EngineInner {
    local: Box<dyn LocalStore>,
    remote: Box<dyn RemoteStore>,
    queue: Mutex<OpQueue>,
    config: SyncConfig,
    state: AtomicU8,
    connected: AtomicBool,
    drain_notify: Notify,
    cancel: CancellationToken,
}

impl EngineInner {
    fn queue(&self) -> MutexGuard<'_, OpQueue> {
        match self.queue.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

enum Gate {
    Ready,
    Disposed,
    Uninitialized,
}

impl SyncEngine {
    pub fn new(
        local: Box<dyn LocalStore>,
        remote: Box<dyn RemoteStore>,
        monitor: Box<dyn ConnectivityMonitor>,
        config: SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                local,
                remote,
                queue: Mutex::new(OpQueue::new()),
                config,
                state: AtomicU8::new(STATE_UNINITIALIZED),
                connected: AtomicBool::new(false),
                drain_notify: Notify::new(),
                cancel: CancellationToken::new(),
            }),
            monitor: Mutex::new(Some(monitor)),
            task: Mutex::new(None),
        }
    }

    /// Brings the engine to the ready state and spawns the background
    /// drain task. Idempotent; a no-op once disposed.
    pub async fn initialize(&self) -> Result<()> {
        if self
            .inner
            .state
            .compare_exchange(
                STATE_UNINITIALIZED,
                STATE_READY,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            // Already ready or disposed.
            return Ok(());
        }

        let mut monitor = match self.lock_monitor().take() {
            Some(monitor) => monitor,
            None => return Err(Error::Setup("connectivity monitor already taken".into())),
        };

        let connected = monitor.has_connection().await;
        self.inner.connected.store(connected, Ordering::Release);
        tracing::info!(connected, "sync engine initialized");

        let events = monitor.subscribe();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(run_loop(inner, monitor, events));
        *self.lock_task() = Some(handle);
        Ok(())
    }

    /// Shuts the engine down. Lets an in-flight submission finish,
    /// then stops the background task. Idempotent.
    pub async fn dispose(&self) {
        let prev = self.inner.state.swap(STATE_DISPOSED, Ordering::AcqRel);
        if prev != STATE_DISPOSED {
            tracing::info!("sync engine disposing");
        }
        self.inner.cancel.cancel();
        self.inner.drain_notify.notify_one();

        let handle = self.lock_task().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Records a new activity locally and queues it for the remote.
    ///
    /// Returns `Ok(true)` when the local write succeeded, `Ok(false)`
    /// when it failed or the engine is disposed. Fails with
    /// [`Error::DeletePending`] before touching the local store if a
    /// delete for the same id is still queued.
    pub async fn add_activity(&self, activity: Activity) -> Result<bool> {
        match self.gate() {
            Gate::Ready => {}
            Gate::Disposed => return Ok(false),
            Gate::Uninitialized => return Err(Error::NotInitialized),
        }
        self.ensure_no_pending_delete(&activity.id)?;
        if !self.inner.local.save(&activity) {
            return Ok(false);
        }
        self.enqueue_or_unwind(SyncOp::add(activity))
    }

    /// Applies an update locally and queues it for the remote.
    ///
    /// Same delete-pending rule as [`SyncEngine::add_activity`].
    pub async fn update_activity(&self, activity: Activity) -> Result<bool> {
        match self.gate() {
            Gate::Ready => {}
            Gate::Disposed => return Ok(false),
            Gate::Uninitialized => return Err(Error::NotInitialized),
        }
        self.ensure_no_pending_delete(&activity.id)?;
        if !self.inner.local.update(&activity) {
            return Ok(false);
        }
        self.enqueue_or_unwind(SyncOp::update(activity))
    }

    /// Deletes an activity locally and queues the delete for the
    /// remote. Idempotent: deleting while a delete for the same id is
    /// already queued reports success without queueing a second op.
    pub async fn delete_activity(&self, activity_id: &str) -> Result<bool> {
        match self.gate() {
            Gate::Ready => {}
            Gate::Disposed => return Ok(false),
            Gate::Uninitialized => return Err(Error::NotInitialized),
        }
        if !self.inner.local.delete(activity_id) {
            return Ok(false);
        }
        match self.enqueue(SyncOp::delete(activity_id)) {
            Ok(()) => Ok(true),
            // A delete is already queued for this id.
            Err(Error::DeletePending(_)) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Reads the local copy of a record.
    pub fn get_activity(&self, activity_id: &str) -> Option<Activity> {
        self.inner.local.get(activity_id)
    }

    /// Number of operations waiting for the remote.
    pub fn pending_ops(&self) -> usize {
        self.inner.queue().len()
    }

    /// Snapshot of the pending operations in submission order.
    pub fn pending_in_order(&self) -> Vec<SyncOp> {
        self.inner.queue().peek_in_order()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == STATE_DISPOSED
    }

    fn gate(&self) -> Gate {
        match self.inner.state.load(Ordering::Acquire) {
            STATE_READY => Gate::Ready,
            STATE_DISPOSED => Gate::Disposed,
            _ => Gate::Uninitialized,
        }
    }

    /// Refuses a mutation whose target still has a delete queued, so
    /// the local store is never touched for a record that cannot be
    /// resurrected.
    fn ensure_no_pending_delete(&self, activity_id: &str) -> Result<()> {
        let pending_delete = self
            .inner
            .queue()
            .get(activity_id)
            .is_some_and(|op| op.kind == OpKind::Delete);
        if pending_delete {
            return Err(Error::DeletePending(activity_id.to_string()));
        }
        Ok(())
    }

    /// Enqueues after a successful local write. If a concurrent
    /// delete slipped in between the pre-check and here, undo the
    /// local write so the record stays gone on both sides.
    fn enqueue_or_unwind(&self, op: SyncOp) -> Result<bool> {
        match self.enqueue(op) {
            Ok(()) => Ok(true),
            Err(Error::DeletePending(id)) => {
                self.inner.local.delete(&id);
                Err(Error::DeletePending(id))
            }
            Err(err) => Err(err),
        }
    }

    fn enqueue(&self, op: SyncOp) -> Result<()> {
        let activity_id = op.activity_id.clone();
        let outcome = self.inner.queue().enqueue(op);
        match outcome {
            EnqueueOutcome::Rejected => return Err(Error::DeletePending(activity_id)),
            EnqueueOutcome::Appended => {
                tracing::debug!(activity_id = %activity_id, "operation queued");
            }
            EnqueueOutcome::Coalesced => {
                tracing::debug!(activity_id = %activity_id, "operation coalesced");
            }
        }
        if self.inner.connected.load(Ordering::Acquire) {
            self.inner.drain_notify.notify_one();
        }
        Ok(())
    }

    fn lock_monitor(&self) -> MutexGuard<'_, Option<Box<dyn ConnectivityMonitor>>> {
        match self.monitor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn run_loop(
    inner: Arc<EngineInner>,
    monitor: Box<dyn ConnectivityMonitor>,
    mut events: mpsc::Receiver<ConnectivityEvent>,
) {
    let mut ticker = tokio::time::interval(inner.config.drain_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the timer
    // branch only fires after a full interval.
    ticker.tick().await;

    let mut events_open = true;
    loop {
        tokio::select! {
            _ = inner.cancel.cancelled() => break,
            _ = inner.drain_notify.notified() => drain(&inner).await,
            event = events.recv(), if events_open => match event {
                Some(ConnectivityEvent::Available) => {
                    inner.connected.store(true, Ordering::Release);
                    tracing::info!("connectivity restored, draining");
                    drain(&inner).await;
                }
                Some(ConnectivityEvent::Unavailable) => {
                    tracing::info!("connectivity lost");
                    inner.connected.store(false, Ordering::Release);
                }
                None => events_open = false,
            },
            _ = ticker.tick() => drain(&inner).await,
        }
    }

    drop(monitor);
}

enum SubmitOutcome {
    /// The operation left the queue, or was superseded and will be
    /// picked up again.
    Done,
    /// Retry budget spent; skip this activity for the rest of the
    /// drain.
    Exhausted(String),
    Cancelled,
}

/// Submits queued operations in arrival order until the queue is
/// empty or everything left has spent its retry budget.
async fn drain(inner: &EngineInner) {
    if inner.state.load(Ordering::Acquire) != STATE_READY {
        return;
    }
    if !inner.connected.load(Ordering::Acquire) {
        return;
    }

    let mut exhausted: HashSet<String> = HashSet::new();
    loop {
        if inner.cancel.is_cancelled() {
            return;
        }
        let next = inner
            .queue()
            .first_matching(|id| !exhausted.contains(id));
        let Some(op) = next else {
            return;
        };
        match submit_with_retry(inner, op).await {
            SubmitOutcome::Done => {}
            SubmitOutcome::Exhausted(id) => {
                exhausted.insert(id);
            }
            SubmitOutcome::Cancelled => return,
        }
    }
}

/// Drives one queue entry through submission, backoff, and conflict
/// resolution.
async fn submit_with_retry(inner: &EngineInner, queued: SyncOp) -> SubmitOutcome {
    // `queued` mirrors the queue entry we took; `outbound` is what we
    // actually send. A conflict refreshes only the outbound snapshot.
    let mut queued = queued;
    let mut outbound = queued.clone();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match inner.remote.submit(outbound.clone()).await {
            Ok(()) => {
                let mut queue = inner.queue();
                // Only dequeue if the entry was not coalesced while
                // the submission was in flight.
                if queue.get(&queued.activity_id) == Some(&queued) {
                    queue.dequeue(&queued.activity_id);
                }
                tracing::debug!(
                    activity_id = %queued.activity_id,
                    kind = %outbound.kind,
                    "operation committed remotely"
                );
                return SubmitOutcome::Done;
            }
            Err(RemoteError::Conflict { remote_timestamp }) => {
                tracing::debug!(
                    activity_id = %queued.activity_id,
                    %remote_timestamp,
                    "conflict reported, refreshing snapshot"
                );
                // Last writer wins from the local point of view:
                // re-read the record and resubmit the current intent.
                if let Some(current) = inner.local.get(&queued.activity_id) {
                    outbound.snapshot = Some(current);
                }
                if attempts >= inner.config.max_attempts {
                    return SubmitOutcome::Exhausted(queued.activity_id);
                }
                // Resubmit immediately; conflicts are not transient
                // faults, so no backoff.
            }
            Err(RemoteError::Transient(reason)) => {
                tracing::warn!(
                    activity_id = %queued.activity_id,
                    attempts,
                    %reason,
                    "submission failed"
                );
                if attempts >= inner.config.max_attempts {
                    tracing::warn!(
                        activity_id = %queued.activity_id,
                        "retry budget exhausted, operation stays queued"
                    );
                    return SubmitOutcome::Exhausted(queued.activity_id);
                }
                let delay = inner.config.backoff_delay(attempts);
                tokio::select! {
                    _ = inner.cancel.cancelled() => return SubmitOutcome::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
                // The entry may have been coalesced during the
                // backoff; a newer intent gets a fresh retry budget.
                let current = inner.queue().get(&queued.activity_id).cloned();
                match current {
                    None => return SubmitOutcome::Done,
                    Some(current) if current != queued => {
                        queued = current.clone();
                        outbound = current;
                        attempts = 0;
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
