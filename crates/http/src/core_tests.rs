// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios for the HTTP core, run against the scripted
//! transport in virtual time.

use crate::*;
use scout_core::{FakeClock, Metrics};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn core(
    transport: Arc<ScriptedTransport>,
    clock: FakeClock,
    rate: f64,
    retry: RetryPolicy,
) -> HttpCore {
    HttpCore::builder()
        .rate_config(RateLimitConfig { default_rate: rate, per_host: HashMap::new() })
        .breaker_config(BreakerConfig { failure_threshold: 5, reset_timeout: Duration::from_secs(60) })
        .retry(retry)
        .transport(transport)
        .metrics(Metrics::new())
        .clock(Arc::new(clock))
        .build()
        .unwrap()
}

// Scenario: 100 discovery URLs on one host at 2 req/s. The request series
// must never exceed rate + 1 in any sliding second, and the total run
// takes at least 49 virtual seconds.
#[tokio::test(start_paused = true)]
async fn rate_limit_compliance_over_100_urls() {
    let transport = Arc::new(ScriptedTransport::new());
    let core = core(transport.clone(), FakeClock::new(), 2.0, RetryPolicy::default());

    let start = tokio::time::Instant::now();
    let mut completed_at = Vec::with_capacity(100);
    for i in 0..100 {
        core.get(&format!("https://example.test/members?page={i}")).await.unwrap();
        completed_at.push(tokio::time::Instant::now().duration_since(start));
    }

    let total = tokio::time::Instant::now().duration_since(start);
    assert!(total >= Duration::from_secs(49), "total {total:?}");
    assert_eq!(transport.call_count("example.test"), 100);

    // Sliding-window property: at most rate + 1 = 3 requests in any
    // half-open one-second window anchored at a request.
    for (i, anchor) in completed_at.iter().enumerate() {
        let window_end = *anchor + Duration::from_secs(1);
        let in_window =
            completed_at[i..].iter().take_while(|t| **t < window_end).count();
        assert!(in_window <= 3, "window at {anchor:?} holds {in_window} requests");
    }
}

// Scenario: a host returning 500 for every request with threshold 5.
// Exactly 5 wire requests before the circuit opens; 50 further attempts
// inside the 60s window make zero wire calls; after 60s one probe goes out.
#[tokio::test(start_paused = true)]
async fn breaker_trip_and_half_open_probe() {
    let transport = Arc::new(ScriptedTransport::new().with_default(Response::with_status(500)));
    let clock = FakeClock::new();
    // max_retries 0 so each call maps to exactly one wire request.
    let core = core(
        transport.clone(),
        clock.clone(),
        1000.0,
        RetryPolicy { max_retries: 0, ..RetryPolicy::default() },
    );

    for _ in 0..5 {
        let err = core.get("https://down.test/a").await.unwrap_err();
        assert!(matches!(err, HttpError::Status { status: 500, .. }));
    }
    assert_eq!(transport.call_count("down.test"), 5);
    assert_eq!(core.breaker().state("down.test"), CircuitState::Open);

    let mut circuit_open_errors = 0;
    for _ in 0..50 {
        match core.get("https://down.test/a").await {
            Err(HttpError::CircuitOpen { .. }) => circuit_open_errors += 1,
            other => panic!("expected CircuitOpen, got {other:?}"),
        }
    }
    assert_eq!(circuit_open_errors, 50);
    assert_eq!(transport.call_count("down.test"), 5, "open circuit made wire calls");

    // After the reset window, exactly one probe goes out.
    clock.advance(Duration::from_secs(60));
    let err = core.get("https://down.test/a").await.unwrap_err();
    assert!(matches!(err, HttpError::Status { status: 500, .. }));
    assert_eq!(transport.call_count("down.test"), 6);
    assert_eq!(core.breaker().state("down.test"), CircuitState::Open);
}

// Scenario: 20 consecutive 429 responses. All trigger retry-with-backoff,
// the breaker stays Closed throughout, and the wire-call count is bounded
// by requests * max_attempts.
#[tokio::test(start_paused = true)]
async fn rate_limit_responses_do_not_open_the_circuit() {
    let transport = Arc::new(ScriptedTransport::new());
    let core = core(transport.clone(), FakeClock::new(), 1000.0, RetryPolicy::default());
    transport.push_status("busy.test", 429, 20);

    // 5 requests * 4 attempts each consume all 20 scripted 429s.
    for _ in 0..5 {
        let err = core.get("https://busy.test/api").await.unwrap_err();
        assert!(matches!(err, HttpError::Status { status: 429, .. }));
        assert_eq!(core.breaker().state("busy.test"), CircuitState::Closed);
    }
    assert_eq!(transport.call_count("busy.test"), 20);

    // Script exhausted: the default 200 proves the host was never tripped.
    let response = core.get("https://busy.test/api").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(core.breaker().state("busy.test"), CircuitState::Closed);
}

// A circuit opening for one host must not affect peers on other hosts.
#[tokio::test(start_paused = true)]
async fn open_circuit_does_not_affect_other_hosts() {
    let transport = Arc::new(ScriptedTransport::new());
    let core = core(
        transport.clone(),
        FakeClock::new(),
        1000.0,
        RetryPolicy { max_retries: 0, ..RetryPolicy::default() },
    );
    transport.push_status("down.test", 500, 5);

    for _ in 0..5 {
        let _ = core.get("https://down.test/x").await;
    }
    assert_eq!(core.breaker().state("down.test"), CircuitState::Open);

    let response = core.get("https://up.test/x").await.unwrap();
    assert_eq!(response.status, 200);
}
