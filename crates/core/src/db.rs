// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed storage for activity records.
//!
//! The [`Database`] struct is the durable local cache the sync engine
//! writes through while offline. Records are keyed by activity id;
//! upserts are idempotent so replaying a mutation has no extra effect.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::activity::{Activity, ActivityType, Category};
use crate::error::{Error, Result};

/// SQL schema for the activity database.
pub const SCHEMA: &str = r#"
-- Activity records keyed by creator-assigned id
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    type TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    description TEXT,
    category TEXT,
    timestamp TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_activities_user ON activities(user_id);
CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse an ISO calendar date from the database.
fn parse_date(value: &str, column: &str) -> std::result::Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid date '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Database handle for activity storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if necessary) a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Opens an in-memory database, used by tests and fakes.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Inserts or replaces an activity record.
    ///
    /// Upsert semantics make repeated saves of the same content a
    /// no-op side-effect-wise.
    pub fn upsert_activity(&self, activity: &Activity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO activities (id, user_id, type, amount, date, description, category, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 user_id = excluded.user_id,
                 type = excluded.type,
                 amount = excluded.amount,
                 date = excluded.date,
                 description = excluded.description,
                 category = excluded.category,
                 timestamp = excluded.timestamp",
            params![
                activity.id,
                activity.user_id,
                activity.activity_type.as_str(),
                activity.amount,
                activity.date.format("%Y-%m-%d").to_string(),
                activity.description,
                activity.category.map(|c| c.as_str()),
                activity.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Deletes an activity by id. Idempotent: deleting a missing
    /// record succeeds.
    pub fn delete_activity(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Fetches an activity by id.
    pub fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, user_id, type, amount, date, description, category, timestamp
                 FROM activities WHERE id = ?1",
                params![id],
                map_activity_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Lists all activities for a user, newest first.
    pub fn list_activities(&self, user_id: &str) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, type, amount, date, description, category, timestamp
             FROM activities WHERE user_id = ?1 ORDER BY timestamp DESC",
        )?;
        let rows = stmt.query_map(params![user_id], map_activity_row)?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?);
        }
        Ok(activities)
    }

    /// Checks whether an activity exists.
    pub fn activity_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Maps a full activities row into an [`Activity`].
fn map_activity_row(row: &rusqlite::Row<'_>) -> std::result::Result<Activity, rusqlite::Error> {
    let type_str: String = row.get(2)?;
    let date_str: String = row.get(4)?;
    let category_str: Option<String> = row.get(6)?;
    let timestamp_str: String = row.get(7)?;

    let category = match category_str {
        None => None,
        Some(s) => Some(parse_db::<Category>(&s, "category")?),
    };

    Ok(Activity {
        id: row.get(0)?,
        user_id: row.get(1)?,
        activity_type: parse_db::<ActivityType>(&type_str, "type")?,
        amount: row.get(3)?,
        date: parse_date(&date_str, "date")?,
        description: row.get(5)?,
        category,
        timestamp: parse_timestamp(&timestamp_str, "timestamp")?,
    })
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
