// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ScriptedTransport;
use scout_core::FakeClock;
use std::collections::HashMap;
use std::sync::Arc;

const HOST: &str = "h.example";
const URL: &str = "https://h.example/page";

struct Fixture {
    core: HttpCore,
    transport: Arc<ScriptedTransport>,
    clock: FakeClock,
    metrics: Metrics,
}

fn fixture(retry: RetryPolicy) -> Fixture {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = FakeClock::new();
    let metrics = Metrics::new();
    let core = HttpCore::builder()
        // High rate so limiter waits do not interfere with retry tests.
        .rate_config(RateLimitConfig { default_rate: 1000.0, per_host: HashMap::new() })
        .retry(retry)
        .transport(transport.clone())
        .metrics(metrics.clone())
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap();
    Fixture { core, transport, clock, metrics }
}

#[tokio::test(start_paused = true)]
async fn success_returns_body_and_counts_request() {
    let f = fixture(RetryPolicy::default());
    f.transport.push(HOST, Ok(Response::ok("<html>members</html>")));

    let response = f.core.get(URL).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<html>members</html>");
    assert_eq!(
        f.metrics.counter(
            "http_requests_total",
            &[("host", HOST), ("method", "GET"), ("status", "200")]
        ),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn server_errors_retry_then_surface() {
    let f = fixture(RetryPolicy::default());
    f.transport.push_status(HOST, 503, 4);

    let err = f.core.get(URL).await.unwrap_err();
    assert!(matches!(err, HttpError::Status { status: 503, .. }));
    // 1 initial + 3 retries
    assert_eq!(f.transport.call_count(HOST), 4);
    assert_eq!(f.metrics.counter("http_errors_total", &[("host", HOST), ("kind", "http_5xx")]), 4);
}

#[tokio::test(start_paused = true)]
async fn recovery_mid_retry_returns_ok() {
    let f = fixture(RetryPolicy::default());
    f.transport.push_status(HOST, 500, 2);
    f.transport.push(HOST, Ok(Response::ok("recovered")));

    let response = f.core.get(URL).await.unwrap();
    assert_eq!(response.body, "recovered");
    assert_eq!(f.transport.call_count(HOST), 3);
}

#[tokio::test(start_paused = true)]
async fn not_found_is_returned_without_retry() {
    let f = fixture(RetryPolicy::default());
    f.transport.push_status(HOST, 404, 1);

    let err = f.core.get(URL).await.unwrap_err();
    assert!(matches!(err, HttpError::Status { status: 404, .. }));
    assert_eq!(f.transport.call_count(HOST), 1);
}

#[tokio::test(start_paused = true)]
async fn forbidden_is_returned_without_retry() {
    let f = fixture(RetryPolicy::default());
    f.transport.push_status(HOST, 403, 1);

    let err = f.core.get(URL).await.unwrap_err();
    assert!(matches!(err, HttpError::Status { status: 403, .. }));
    assert_eq!(f.transport.call_count(HOST), 1);
}

#[tokio::test(start_paused = true)]
async fn timeouts_retry_and_count_against_breaker() {
    let f = fixture(RetryPolicy { max_retries: 1, ..RetryPolicy::default() });
    f.transport.push(HOST, Err(HttpError::Timeout { host: HOST.into() }));
    f.transport.push(HOST, Ok(Response::ok("late but fine")));

    let response = f.core.get(URL).await.unwrap();
    assert_eq!(response.body, "late but fine");
    assert_eq!(f.transport.call_count(HOST), 2);
    assert_eq!(f.metrics.counter("http_errors_total", &[("host", HOST), ("kind", "timeout")]), 1);
}

#[tokio::test(start_paused = true)]
async fn open_circuit_rejects_without_network_calls() {
    let f = fixture(RetryPolicy::default());
    for _ in 0..5 {
        f.core.breaker().record_failure(HOST);
    }

    let err = f.core.get(URL).await.unwrap_err();
    assert!(matches!(err, HttpError::CircuitOpen { .. }));
    assert_eq!(f.transport.call_count(HOST), 0);
}

#[tokio::test(start_paused = true)]
async fn retry_after_header_drives_429_backoff() {
    let f = fixture(RetryPolicy::default());
    f.transport.push(
        HOST,
        Ok(Response { status: 429, body: String::new(), retry_after_secs: Some(7) }),
    );
    f.transport.push(HOST, Ok(Response::ok("after backoff")));

    let start = tokio::time::Instant::now();
    let response = f.core.get(URL).await.unwrap();
    assert_eq!(response.body, "after backoff");
    assert!(tokio::time::Instant::now().duration_since(start) >= Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn invalid_url_fails_before_any_machinery() {
    let f = fixture(RetryPolicy::default());
    let err = f.core.get("not a url").await.unwrap_err();
    assert!(matches!(err, HttpError::InvalidUrl(_)));
    assert!(f.transport.calls().is_empty());
    let _ = f.clock;
}
