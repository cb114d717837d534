// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-core: Shared library for the tally activity tracker
//!
//! This crate provides the core data structures, validation rules,
//! SQLite persistence, and sync primitives used by the tally sync
//! engine.

pub mod activity;
pub mod db;
pub mod error;
pub mod op;
pub mod protocol;
pub mod queue;

pub use activity::{Activity, ActivityType, Category};
pub use db::Database;
pub use error::{Error, Result};
pub use op::{OpKind, SyncOp};
pub use protocol::{ClientMessage, ServerMessage};
pub use queue::{EnqueueOutcome, OpQueue};
