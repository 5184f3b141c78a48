// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy: exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Bounded retry with exponential backoff.
///
/// Delay for attempt `n` (0-indexed) is `base * multiplier^n`, capped at
/// `max_backoff`, plus uniform jitter in `[0, base)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base: Duration::from_secs(2),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Deterministic portion of the delay for a 0-indexed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_backoff.as_secs_f64()))
    }

    /// Delay with uniform jitter in `[0, base)` added, still capped.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..self.base.as_secs_f64().max(f64::EPSILON));
        let total = self.delay_for(attempt).as_secs_f64() + jitter;
        Duration::from_secs_f64(total.min(self.max_backoff.as_secs_f64() + self.base.as_secs_f64()))
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
