// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error types and their pipeline classification.

use scout_core::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the HTTP core.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("request to {host} timed out")]
    Timeout { host: String },

    #[error("connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    #[error("{host} returned status {status}")]
    Status { host: String, status: u16 },

    #[error("circuit open for {host}, resets in {}s", retry_in.as_secs())]
    CircuitOpen { host: String, retry_in: Duration },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("transport error for {host}: {message}")]
    Transport { host: String, message: String },
}

impl HttpError {
    /// The host this error is keyed on, empty for URL parse failures.
    pub fn host(&self) -> &str {
        match self {
            HttpError::Timeout { host }
            | HttpError::Connect { host, .. }
            | HttpError::Status { host, .. }
            | HttpError::CircuitOpen { host, .. }
            | HttpError::Transport { host, .. } => host,
            HttpError::InvalidUrl(_) => "",
        }
    }

    /// Short label for the `http_errors_total{kind}` metric.
    pub fn metric_kind(&self) -> &'static str {
        match self {
            HttpError::Timeout { .. } => "timeout",
            HttpError::Connect { .. } => "connect",
            HttpError::Status { status, .. } if *status == 429 => "http_429",
            HttpError::Status { status, .. } if (500..600).contains(status) => "http_5xx",
            HttpError::Status { .. } => "http_status",
            HttpError::CircuitOpen { .. } => "circuit_open",
            HttpError::InvalidUrl(_) => "invalid_url",
            HttpError::Transport { .. } => "transport",
        }
    }

    /// Whether this failure counts against the circuit breaker.
    ///
    /// 5xx, connection errors, and timeouts mean host degradation.
    /// 429 is back-pressure, not unavailability, and never trips the breaker.
    pub fn is_breaker_failure(&self) -> bool {
        match self {
            HttpError::Timeout { .. } | HttpError::Connect { .. } => true,
            HttpError::Status { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    /// Whether the retry loop should attempt this request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Timeout { .. } | HttpError::Connect { .. } => true,
            HttpError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Pipeline-level error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Timeout { .. } | HttpError::Connect { .. } | HttpError::Transport { .. } => {
                ErrorKind::Transient
            }
            HttpError::Status { status, .. } => match status {
                404 | 410 => ErrorKind::NotFound,
                401 | 403 => ErrorKind::Forbidden,
                429 => ErrorKind::Transient,
                s if (500..600).contains(s) => ErrorKind::Transient,
                _ => ErrorKind::Parse,
            },
            HttpError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            HttpError::InvalidUrl(_) => ErrorKind::Parse,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
