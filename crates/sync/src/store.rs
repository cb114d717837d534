// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local persistence behind the sync engine.
//!
//! The engine treats local writes as best-effort from the caller's
//! point of view: a failed write reports `false` and is logged, it
//! never tears down the engine.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tally_core::{Activity, Database};

use crate::error::Result;

/// Storage for the device-local copy of the data set.
///
/// Implementations must be cheap to call from async context; the
/// engine invokes these inline on the mutation path.
pub trait LocalStore: Send + Sync {
    /// Persist a new record. Returns false if the write failed.
    fn save(&self, activity: &Activity) -> bool;
    /// Persist an updated record. Returns false if the write failed.
    fn update(&self, activity: &Activity) -> bool;
    /// Remove a record. Removing a missing record is not an error.
    fn delete(&self, activity_id: &str) -> bool;
    /// Read back the current local state of a record.
    fn get(&self, activity_id: &str) -> Option<Activity>;
}

/// SQLite-backed [`LocalStore`].
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::open_in_memory()?),
        })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LocalStore for SqliteStore {
    fn save(&self, activity: &Activity) -> bool {
        match self.db().upsert_activity(activity) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(activity_id = %activity.id, error = %err, "local save failed");
                false
            }
        }
    }

    fn update(&self, activity: &Activity) -> bool {
        match self.db().upsert_activity(activity) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(activity_id = %activity.id, error = %err, "local update failed");
                false
            }
        }
    }

    fn delete(&self, activity_id: &str) -> bool {
        match self.db().delete_activity(activity_id) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(activity_id, error = %err, "local delete failed");
                false
            }
        }
    }

    fn get(&self, activity_id: &str) -> Option<Activity> {
        match self.db().get_activity(activity_id) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(activity_id, error = %err, "local read failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
