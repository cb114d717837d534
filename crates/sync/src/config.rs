// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tunable knobs for the drain loop.

use std::time::Duration;

/// Retry and scheduling parameters for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Total submission attempts per operation before it is parked
    /// until the next drain (initial attempt included).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Each subsequent retry multiplies the previous delay by this.
    pub backoff_multiplier: u32,
    /// How often the background task drains the queue even without a
    /// connectivity event or a fresh mutation.
    pub drain_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            backoff_multiplier: 2,
            drain_interval: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    /// Delay to wait after the given 1-based attempt fails.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_multiplier.saturating_pow(exponent);
        self.initial_backoff.saturating_mul(factor)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
