// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core activity types for the tally tracker.
//!
//! This module contains the fundamental data types: Activity,
//! ActivityType, and Category. Validation happens at construction;
//! a record that fails any rule is never built, so everything past
//! this boundary can assume well-formed data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum length of an activity description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Earliest calendar date an activity may carry.
pub fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Classification of activities by their financial nature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
    /// Movement between the user's own accounts.
    Transfer,
}

impl ActivityType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Income => "income",
            ActivityType::Expense => "expense",
            ActivityType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "income" => Ok(ActivityType::Income),
            "expense" => Ok(ActivityType::Expense),
            "transfer" => Ok(ActivityType::Transfer),
            _ => Err(Error::InvalidActivityType(s.to_string())),
        }
    }
}

/// Spending category an activity may be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Transport,
    Housing,
    Utilities,
    Entertainment,
    Health,
    Other,
}

impl Category {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "housing" => Ok(Category::Housing),
            "utilities" => Ok(Category::Utilities),
            "entertainment" => Ok(Category::Entertainment),
            "health" => Ok(Category::Health),
            "other" => Ok(Category::Other),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// The primary entity being tracked and synced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Stable identifier assigned by the creator.
    pub id: String,
    /// Owner of the activity.
    pub user_id: String,
    /// Financial classification.
    pub activity_type: ActivityType,
    /// Non-negative finite amount.
    pub amount: f64,
    /// Calendar date of the activity, within [2000-01-01, today].
    pub date: NaiveDate,
    /// Free-form note, non-empty and at most 500 chars if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Spending category, if filed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Creation/modification instant, used for last-writer-wins
    /// conflict ordering.
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    /// Creates a validated activity.
    ///
    /// Returns an error if any field violates the domain invariants;
    /// an invalid record is never constructed.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        activity_type: ActivityType,
        amount: f64,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let id = id.into();
        let user_id = user_id.into();

        if id.trim().is_empty() {
            return Err(Error::InvalidInput("activity id must not be empty".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount(amount));
        }
        if date < earliest_date() || date > Utc::now().date_naive() {
            return Err(Error::DateOutOfRange(date));
        }

        Ok(Activity {
            id,
            user_id,
            activity_type,
            amount,
            date,
            description: None,
            category: None,
            timestamp,
        })
    }

    /// Attaches a description, validating length and non-emptiness.
    pub fn with_description(mut self, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(Error::InvalidDescription(
                "description must not be empty when present".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::InvalidDescription(format!(
                "description exceeds {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        self.description = Some(description);
        Ok(self)
    }

    /// Files the activity under a category (builder pattern).
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Returns a copy with a refreshed modification timestamp.
    pub fn touched(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
