// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host circuit breaker.
//!
//! Three states per host: `Closed` (normal), `Open` (fail fast), and
//! `HalfOpen` (one probe allowed). Transitions:
//!
//! - `Closed -> Open` at `failure_threshold` consecutive failures
//! - `Open -> HalfOpen` once `reset_timeout` has elapsed
//! - `HalfOpen -> Closed` on the first probe success
//! - `HalfOpen -> Open` on any probe failure
//!
//! What counts as a failure is decided by the caller via
//! [`HttpError::is_breaker_failure`](crate::HttpError::is_breaker_failure):
//! 5xx, connection errors, and timeouts do; 429 does not.
//!
//! Callers granted a half-open probe must report the outcome with
//! `record_success` or `record_failure`; the probe slot stays taken until
//! they do.

use crate::HttpError;
use parking_lot::Mutex;
use scout_core::SharedClock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Breaker thresholds.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, reset_timeout: Duration::from_secs(60) }
    }
}

/// Observable state of one host's circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

scout_core::simple_display! {
    CircuitState {
        Closed => "closed",
        Open => "open",
        HalfOpen => "half_open",
    }
}

#[derive(Debug)]
struct HostCircuit {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

impl Default for HostCircuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker keyed by host. All transitions happen under one lock,
/// so they are atomic with respect to concurrent acquirers.
pub struct CircuitBreaker {
    config: BreakerConfig,
    clock: SharedClock,
    hosts: Mutex<HashMap<String, HostCircuit>>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig, clock: SharedClock) -> Self {
        Self { config, clock, hosts: Mutex::new(HashMap::new()) }
    }

    /// Check whether a request to `host` may proceed.
    ///
    /// `Open` rejects immediately; `HalfOpen` admits exactly one probe.
    pub fn check(&self, host: &str) -> Result<(), HttpError> {
        let now = self.clock.now();
        let mut hosts = self.hosts.lock();
        let circuit = hosts.entry(host.to_string()).or_default();

        // Lazy Open -> HalfOpen transition on first check after the window.
        if circuit.state == CircuitState::Open {
            let elapsed = circuit.opened_at.map(|t| now.saturating_duration_since(t));
            if elapsed.is_some_and(|e| e >= self.config.reset_timeout) {
                circuit.state = CircuitState::HalfOpen;
                circuit.probe_in_flight = false;
                tracing::info!(host, "circuit half-open, probing");
            }
        }

        match circuit.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = circuit
                    .opened_at
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or_default();
                let retry_in = self.config.reset_timeout.saturating_sub(elapsed);
                Err(HttpError::CircuitOpen { host: host.to_string(), retry_in })
            }
            CircuitState::HalfOpen => {
                if circuit.probe_in_flight {
                    Err(HttpError::CircuitOpen {
                        host: host.to_string(),
                        retry_in: Duration::ZERO,
                    })
                } else {
                    circuit.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Record a successful request. `HalfOpen -> Closed`.
    pub fn record_success(&self, host: &str) {
        let mut hosts = self.hosts.lock();
        let circuit = hosts.entry(host.to_string()).or_default();
        if circuit.state == CircuitState::HalfOpen {
            tracing::info!(host, "circuit closed after successful probe");
            circuit.state = CircuitState::Closed;
        }
        circuit.consecutive_failures = 0;
        circuit.probe_in_flight = false;
    }

    /// Record a breaker-relevant failure. `Closed -> Open` at threshold,
    /// `HalfOpen -> Open` immediately.
    pub fn record_failure(&self, host: &str) {
        let now = self.clock.now();
        let mut hosts = self.hosts.lock();
        let circuit = hosts.entry(host.to_string()).or_default();
        circuit.consecutive_failures += 1;
        circuit.probe_in_flight = false;

        match circuit.state {
            CircuitState::HalfOpen => {
                tracing::warn!(host, "probe failed, circuit re-opened");
                circuit.state = CircuitState::Open;
                circuit.opened_at = Some(now);
            }
            CircuitState::Closed => {
                if circuit.consecutive_failures >= self.config.failure_threshold {
                    tracing::warn!(
                        host,
                        failures = circuit.consecutive_failures,
                        "failure threshold reached, circuit opened"
                    );
                    circuit.state = CircuitState::Open;
                    circuit.opened_at = Some(now);
                }
            }
            CircuitState::Open => {
                circuit.opened_at = Some(now);
            }
        }
    }

    /// Current state for a host; `Closed` if never seen.
    pub fn state(&self, host: &str) -> CircuitState {
        // Apply the lazy Open -> HalfOpen transition so observers see the
        // same state a check() would.
        let now = self.clock.now();
        let mut hosts = self.hosts.lock();
        let Some(circuit) = hosts.get_mut(host) else {
            return CircuitState::Closed;
        };
        if circuit.state == CircuitState::Open {
            let elapsed = circuit.opened_at.map(|t| now.saturating_duration_since(t));
            if elapsed.is_some_and(|e| e >= self.config.reset_timeout) {
                circuit.state = CircuitState::HalfOpen;
                circuit.probe_in_flight = false;
            }
        }
        circuit.state
    }

    /// Clear all circuit state. Used by operator tooling and tests.
    pub fn reset(&self) {
        self.hosts.lock().clear();
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
