// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host token-bucket rate limiter.
//!
//! One bucket per host, refilled continuously at the configured rate.
//! Acquisition is FIFO per host: waiters queue on a `tokio::sync::Mutex`
//! that is held across the refill wait, so a caller that arrived first
//! takes the next token. Dropping the `acquire` future (cancellation)
//! releases the queue position immediately.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-host request rates in tokens (requests) per second.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub default_rate: f64,
    /// Exact host or parent-domain rates. `sub.pma.example` inherits the
    /// rate configured for `pma.example`.
    pub per_host: HashMap<String, f64>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { default_rate: 1.0, per_host: HashMap::new() }
    }
}

impl RateLimitConfig {
    /// Rate for a host: exact match, then parent-domain suffix, then default.
    pub fn rate_for(&self, host: &str) -> f64 {
        if let Some(rate) = self.per_host.get(host) {
            return *rate;
        }
        for (key, rate) in &self.per_host {
            if host.ends_with(&format!(".{key}")) {
                return *rate;
            }
        }
        self.default_rate
    }
}

struct Bucket {
    tokens: f64,
    capacity: f64,
    rate: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(rate: f64, now: Instant) -> Self {
        let capacity = rate.ceil().max(1.0);
        // Buckets start full so a burst up to capacity is allowed.
        Self { tokens: capacity, capacity, rate, last_refill: now }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Token-bucket limiter keyed by host.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Bucket>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config, buckets: Mutex::new(HashMap::new()) }
    }

    fn bucket_for(&self, host: &str) -> Arc<tokio::sync::Mutex<Bucket>> {
        let mut buckets = self.buckets.lock();
        buckets
            .entry(host.to_string())
            .or_insert_with(|| {
                let rate = self.config.rate_for(host);
                Arc::new(tokio::sync::Mutex::new(Bucket::new(rate, Instant::now())))
            })
            .clone()
    }

    /// Block until one token is available for `host`, then consume it.
    pub async fn acquire(&self, host: &str) {
        let bucket = self.bucket_for(host);
        // Held across the wait: tokio mutexes wake waiters in FIFO order,
        // which is the per-host ordering guarantee.
        let mut guard = bucket.lock().await;
        loop {
            let now = Instant::now();
            guard.refill(now);
            if guard.tokens >= 1.0 {
                guard.tokens -= 1.0;
                return;
            }
            let deficit = 1.0 - guard.tokens;
            let wait = Duration::from_secs_f64(deficit / guard.rate);
            tokio::time::sleep(wait).await;
        }
    }

    /// The configured rate for a host (for verdict reporting).
    pub fn rate_for(&self, host: &str) -> f64 {
        self.config.rate_for(host)
    }
}

#[cfg(test)]
#[path = "limiter_tests.rs"]
mod tests;
