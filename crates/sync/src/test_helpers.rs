// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fakes for sync engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::mpsc;

use tally_core::{Activity, ActivityType, SyncOp};

use crate::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::remote::{RemoteError, RemoteStore};
use crate::store::LocalStore;

pub fn make_activity(id: &str, amount: f64) -> Activity {
    Activity::new(
        id,
        "user-1",
        ActivityType::Expense,
        amount,
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )
    .unwrap()
}

/// In-memory [`LocalStore`] with failure injection and a read counter.
#[derive(Default)]
pub struct MockLocalStore {
    records: Mutex<HashMap<String, Activity>>,
    fail_writes: AtomicBool,
    get_calls: AtomicUsize,
}

impl MockLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    pub fn get_call_count(&self) -> usize {
        self.get_calls.load(Ordering::Acquire)
    }

    pub fn seed(&self, activity: Activity) {
        self.records
            .lock()
            .unwrap()
            .insert(activity.id.clone(), activity);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.lock().unwrap().contains_key(id)
    }
}

impl LocalStore for Arc<MockLocalStore> {
    fn save(&self, activity: &Activity) -> bool {
        if self.fail_writes.load(Ordering::Acquire) {
            return false;
        }
        self.records
            .lock()
            .unwrap()
            .insert(activity.id.clone(), activity.clone());
        true
    }

    fn update(&self, activity: &Activity) -> bool {
        self.save(activity)
    }

    fn delete(&self, activity_id: &str) -> bool {
        if self.fail_writes.load(Ordering::Acquire) {
            return false;
        }
        self.records.lock().unwrap().remove(activity_id);
        true
    }

    fn get(&self, activity_id: &str) -> Option<Activity> {
        self.get_calls.fetch_add(1, Ordering::AcqRel);
        self.records.lock().unwrap().get(activity_id).cloned()
    }
}

/// Scriptable [`RemoteStore`] recording every submission.
#[derive(Default)]
pub struct MockRemoteStore {
    script: Mutex<VecDeque<Result<(), RemoteError>>>,
    always_fail: AtomicBool,
    fail_ids: Mutex<HashSet<String>>,
    submitted: Mutex<Vec<SyncOp>>,
    hold: Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues scripted responses consumed in order; once the script
    /// runs dry, submissions succeed.
    pub fn script(&self, responses: Vec<Result<(), RemoteError>>) {
        self.script.lock().unwrap().extend(responses);
    }

    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::Release);
    }

    /// Every submission for this activity id fails as transient.
    pub fn fail_for(&self, activity_id: &str) {
        self.fail_ids.lock().unwrap().insert(activity_id.into());
    }

    /// Makes the next submission park mid-flight until the returned
    /// sender fires (or is dropped).
    pub fn hold_next(&self) -> tokio::sync::oneshot::Sender<()> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        *self.hold.lock().unwrap() = Some(rx);
        tx
    }

    pub fn submitted(&self) -> Vec<SyncOp> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_ids(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|op| op.activity_id.clone())
            .collect()
    }

    pub fn transient(reason: &str) -> Result<(), RemoteError> {
        Err(RemoteError::Transient(reason.into()))
    }

    pub fn conflict(remote_timestamp: DateTime<Utc>) -> Result<(), RemoteError> {
        Err(RemoteError::Conflict { remote_timestamp })
    }
}

impl RemoteStore for Arc<MockRemoteStore> {
    fn submit(
        &self,
        op: SyncOp,
    ) -> Pin<Box<dyn Future<Output = Result<(), RemoteError>> + Send + '_>> {
        Box::pin(async move {
            self.submitted.lock().unwrap().push(op.clone());
            let held = self.hold.lock().unwrap().take();
            if let Some(release) = held {
                let _ = release.await;
            }
            if self.always_fail.load(Ordering::Acquire)
                || self.fail_ids.lock().unwrap().contains(&op.activity_id)
            {
                return Err(RemoteError::Transient("injected failure".into()));
            }
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
        })
    }
}

/// Hand-driven connectivity: tests flip state through the handle.
pub struct MockConnectivity {
    online: Arc<AtomicBool>,
    event_rx: Option<mpsc::Receiver<ConnectivityEvent>>,
}

pub struct ConnectivityHandle {
    online: Arc<AtomicBool>,
    event_tx: mpsc::Sender<ConnectivityEvent>,
}

pub fn mock_connectivity(initially_online: bool) -> (MockConnectivity, ConnectivityHandle) {
    let (event_tx, event_rx) = mpsc::channel(16);
    let online = Arc::new(AtomicBool::new(initially_online));
    (
        MockConnectivity {
            online: Arc::clone(&online),
            event_rx: Some(event_rx),
        },
        ConnectivityHandle { online, event_tx },
    )
}

impl ConnectivityHandle {
    /// Flips state without emitting an event, as if the change went
    /// unnoticed until the next periodic drain.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    pub async fn go_online(&self) {
        self.set_online(true);
        let _ = self.event_tx.send(ConnectivityEvent::Available).await;
    }

    pub async fn go_offline(&self) {
        self.set_online(false);
        let _ = self.event_tx.send(ConnectivityEvent::Unavailable).await;
    }
}

impl ConnectivityMonitor for MockConnectivity {
    fn has_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let online = self.online.load(Ordering::Acquire);
        Box::pin(async move { online })
    }

    fn subscribe(&mut self) -> mpsc::Receiver<ConnectivityEvent> {
        self.event_rx.take().unwrap_or_else(|| {
            let (_tx, rx) = mpsc::channel(1);
            rx
        })
    }
}
