// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-sync: offline-first synchronization engine.
//!
//! Accepts mutations while disconnected, queues them durably in the
//! local store, and reconciles against the remote authoritative store
//! once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Caller    │────►│  SyncEngine  │────►│ RemoteStore │
//! └─────────────┘     │              │◄────│   (trait)   │
//!                     │  ┌────────┐  │     └─────────────┘
//!                     │  │ OpQueue│  │     ┌─────────────┐
//!                     │  └────────┘  │◄────│Connectivity │
//!                     └──────┬───────┘     │  Monitor    │
//!                            ▼             └─────────────┘
//!                     ┌─────────────┐
//!                     │ LocalStore  │  (write-ahead cache)
//!                     │   (trait)   │
//!                     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Local-first writes: mutations land in the local store before
//!   anything touches the network
//! - Per-activity coalescing: at most one pending op per record
//! - Drain with exponential backoff and a capped retry budget
//! - Last-writer-wins conflict resolution by record timestamp
//! - Injectable store/connectivity traits for testing

pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod remote;
pub mod store;

pub use config::SyncConfig;
pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, TcpProbeMonitor};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use remote::{RemoteError, RemoteStore, WebSocketRemote};
pub use store::{LocalStore, SqliteStore};

#[cfg(test)]
mod test_helpers;
