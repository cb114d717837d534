// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the synchronization engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sync engine is not initialized\n  hint: call initialize() before mutating")]
    NotInitialized,

    #[error("activity '{0}' has a delete pending\n  hint: wait for the delete to sync before touching this record again")]
    DeletePending(String),

    #[error("engine setup failed: {0}")]
    Setup(String),

    #[error(transparent)]
    Core(#[from] tally_core::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
