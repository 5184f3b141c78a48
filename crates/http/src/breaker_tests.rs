// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use scout_core::FakeClock;
use std::sync::Arc;

const HOST: &str = "failing.example";

fn breaker_with_clock() -> (CircuitBreaker, FakeClock) {
    let clock = FakeClock::new();
    let breaker = CircuitBreaker::new(BreakerConfig::default(), Arc::new(clock.clone()));
    (breaker, clock)
}

#[test]
fn stays_closed_below_threshold() {
    let (breaker, _clock) = breaker_with_clock();
    for _ in 0..4 {
        breaker.record_failure(HOST);
    }
    assert_eq!(breaker.state(HOST), CircuitState::Closed);
    assert!(breaker.check(HOST).is_ok());
}

#[test]
fn opens_at_consecutive_failure_threshold() {
    let (breaker, _clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    assert_eq!(breaker.state(HOST), CircuitState::Open);
    let err = breaker.check(HOST).unwrap_err();
    assert!(matches!(err, HttpError::CircuitOpen { .. }));
}

#[test]
fn success_resets_the_consecutive_count() {
    let (breaker, _clock) = breaker_with_clock();
    for _ in 0..4 {
        breaker.record_failure(HOST);
    }
    breaker.record_success(HOST);
    for _ in 0..4 {
        breaker.record_failure(HOST);
    }
    assert_eq!(breaker.state(HOST), CircuitState::Closed);
}

#[test]
fn open_reports_remaining_reset_time() {
    let (breaker, clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    clock.advance(Duration::from_secs(20));
    match breaker.check(HOST).unwrap_err() {
        HttpError::CircuitOpen { retry_in, .. } => {
            assert_eq!(retry_in, Duration::from_secs(40));
        }
        other => panic!("expected CircuitOpen, got {other:?}"),
    }
}

#[test]
fn transitions_to_half_open_after_reset_timeout() {
    let (breaker, clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    clock.advance(Duration::from_secs(60));
    assert_eq!(breaker.state(HOST), CircuitState::HalfOpen);
    assert!(breaker.check(HOST).is_ok());
}

#[test]
fn half_open_admits_exactly_one_probe() {
    let (breaker, clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    clock.advance(Duration::from_secs(60));

    assert!(breaker.check(HOST).is_ok());
    // Second concurrent caller is rejected while the probe is in flight.
    assert!(breaker.check(HOST).is_err());
}

#[test]
fn probe_success_closes_the_circuit() {
    let (breaker, clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    clock.advance(Duration::from_secs(60));
    assert!(breaker.check(HOST).is_ok());
    breaker.record_success(HOST);
    assert_eq!(breaker.state(HOST), CircuitState::Closed);
    assert!(breaker.check(HOST).is_ok());
}

#[test]
fn probe_failure_reopens_for_a_full_window() {
    let (breaker, clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    clock.advance(Duration::from_secs(60));
    assert!(breaker.check(HOST).is_ok());
    breaker.record_failure(HOST);
    assert_eq!(breaker.state(HOST), CircuitState::Open);

    // Not yet: window restarts from the probe failure.
    clock.advance(Duration::from_secs(59));
    assert!(breaker.check(HOST).is_err());
    clock.advance(Duration::from_secs(1));
    assert!(breaker.check(HOST).is_ok());
}

#[test]
fn hosts_are_independent() {
    let (breaker, _clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    assert_eq!(breaker.state(HOST), CircuitState::Open);
    assert_eq!(breaker.state("healthy.example"), CircuitState::Closed);
    assert!(breaker.check("healthy.example").is_ok());
}

#[test]
fn reset_clears_all_hosts() {
    let (breaker, _clock) = breaker_with_clock();
    for _ in 0..5 {
        breaker.record_failure(HOST);
    }
    breaker.reset();
    assert_eq!(breaker.state(HOST), CircuitState::Closed);
}
