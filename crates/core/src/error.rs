// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tally-core operations.

use thiserror::Error;

/// All possible errors that can occur in tally-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("invalid activity type: '{0}'\n  hint: valid types are: income, expense, transfer")]
    InvalidActivityType(String),

    #[error(
        "invalid category: '{0}'\n  hint: valid categories are: food, transport, housing, utilities, entertainment, health, other"
    )]
    InvalidCategory(String),

    #[error("invalid amount: {0}\n  hint: amount must be a non-negative finite number")]
    InvalidAmount(f64),

    #[error("date out of range: {0}\n  hint: dates must fall between 2000-01-01 and today")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("invalid description: {0}")]
    InvalidDescription(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for tally-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
