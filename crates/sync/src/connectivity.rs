// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity detection.
//!
//! The engine never probes the network itself. It consumes a
//! [`ConnectivityMonitor`] and reacts to the transition events the
//! monitor emits, so tests can flip connectivity synthetically and
//! production can plug in a real probe.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A change in network reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Available,
    Unavailable,
}

/// Source of connectivity state for the engine.
pub trait ConnectivityMonitor: Send + Sync {
    /// One-shot reachability check, used to seed engine state at
    /// startup.
    fn has_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Hands over the event stream. The engine subscribes exactly
    /// once; later calls return a closed receiver.
    fn subscribe(&mut self) -> mpsc::Receiver<ConnectivityEvent>;
}

/// Monitor that periodically opens a TCP connection to a well-known
/// address and reports edges when reachability flips.
pub struct TcpProbeMonitor {
    addr: String,
    probe_interval: Duration,
    probe_timeout: Duration,
    online: Arc<AtomicBool>,
    event_tx: mpsc::Sender<ConnectivityEvent>,
    event_rx: Option<mpsc::Receiver<ConnectivityEvent>>,
    cancel: CancellationToken,
}

impl TcpProbeMonitor {
    pub fn new(addr: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(16);
        Self {
            addr: addr.into(),
            probe_interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(2),
            online: Arc::new(AtomicBool::new(false)),
            event_tx,
            event_rx: Some(event_rx),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_intervals(mut self, probe_interval: Duration, probe_timeout: Duration) -> Self {
        self.probe_interval = probe_interval;
        self.probe_timeout = probe_timeout;
        self
    }

    /// Spawns the background probe task.
    pub fn start(&self) {
        let addr = self.addr.clone();
        let interval = self.probe_interval;
        let timeout = self.probe_timeout;
        let online = Arc::clone(&self.online);
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(probe_loop(addr, interval, timeout, online, event_tx, cancel));
    }

    /// Stops the probe task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}

async fn probe(addr: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

async fn probe_loop(
    addr: String,
    probe_interval: Duration,
    probe_timeout: Duration,
    online: Arc<AtomicBool>,
    event_tx: mpsc::Sender<ConnectivityEvent>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(probe_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let up = probe(&addr, probe_timeout).await;
                let was = online.swap(up, Ordering::AcqRel);
                if was != up {
                    tracing::info!(addr = %addr, online = up, "connectivity changed");
                    let event = if up {
                        ConnectivityEvent::Available
                    } else {
                        ConnectivityEvent::Unavailable
                    };
                    if event_tx.send(event).await.is_err() {
                        // Subscriber is gone, nothing left to report to.
                        break;
                    }
                }
            }
        }
    }
}

impl ConnectivityMonitor for TcpProbeMonitor {
    fn has_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let addr = self.addr.clone();
        let timeout = self.probe_timeout;
        Box::pin(async move { probe(&addr, timeout).await })
    }

    fn subscribe(&mut self) -> mpsc::Receiver<ConnectivityEvent> {
        self.event_rx.take().unwrap_or_else(|| {
            let (_tx, rx) = mpsc::channel(1);
            rx
        })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
