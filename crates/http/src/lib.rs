// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scout-http: the rate-limited HTTP core.
//!
//! Every network-touching agent goes through [`HttpCore`], which composes
//! a per-host token bucket, a per-host circuit breaker, and a bounded
//! retry policy around a pluggable [`Transport`]. The guarantees:
//!
//! - per-host request rate never exceeds the configured ceiling
//! - a degraded host fails fast (`CircuitOpen`) instead of queueing
//! - transient failures retry with exponential backoff and jitter
//! - every request lands in the metrics registry

mod breaker;
mod client;
mod error;
mod limiter;
mod retry;
mod transport;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitState};
pub use client::{HttpCore, HttpCoreBuilder};
pub use error::HttpError;
pub use limiter::{RateLimitConfig, RateLimiter};
pub use retry::RetryPolicy;
pub use transport::{ReqwestTransport, Response, Transport};

#[cfg(any(test, feature = "test-support"))]
pub use transport::ScriptedTransport;

#[cfg(test)]
#[path = "core_tests.rs"]
mod core_tests;
