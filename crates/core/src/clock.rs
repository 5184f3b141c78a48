// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! The rate limiter, circuit breaker, secret cache, and retry policy all
//! consult a [`Clock`] rather than ambient time, so tests drive them with
//! [`FakeClock`] and never sleep on wall-clock time.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that provides the current time.
///
/// Object-safe so components can share one `Arc<dyn Clock>`.
pub trait Clock: Send + Sync {
    /// Monotonic instant for interval arithmetic.
    fn now(&self) -> Instant;

    /// Wall-clock time for record timestamps and file names.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64 {
        self.utc_now().timestamp_millis().max(0) as u64
    }
}

/// Shared clock handle threaded through limiter, breaker, and caches.
pub type SharedClock = Arc<dyn Clock>;

/// The system clock as a [`SharedClock`].
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for testing with controllable time.
///
/// `advance` moves both the monotonic and wall-clock views together so
/// interval math and timestamps stay consistent within a test.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockInner>>,
}

struct FakeClockInner {
    current: Instant,
    epoch_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockInner {
                current: Instant::now(),
                // Arbitrary but stable starting point: 2026-01-01T00:00:00Z
                epoch_ms: 1_767_225_600_000,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.current += duration;
        inner.epoch_ms += duration.as_millis() as u64;
    }

    /// Set the epoch milliseconds value
    pub fn set_epoch_ms(&self, ms: u64) {
        self.inner.lock().epoch_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().current
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let ms = self.inner.lock().epoch_ms;
        Utc.timestamp_millis_opt(ms as i64).single().unwrap_or_default()
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
