// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn status(code: u16) -> HttpError {
    HttpError::Status { host: "h.example".into(), status: code }
}

#[test]
fn rate_limit_responses_never_count_against_the_breaker() {
    assert!(!status(429).is_breaker_failure());
    assert!(status(429).is_retryable());
}

#[test]
fn server_errors_are_breaker_failures_and_retryable() {
    for code in [500, 502, 503, 504] {
        assert!(status(code).is_breaker_failure(), "{code}");
        assert!(status(code).is_retryable(), "{code}");
    }
}

#[test]
fn timeouts_and_connect_errors_are_breaker_failures() {
    let timeout = HttpError::Timeout { host: "h.example".into() };
    let connect = HttpError::Connect { host: "h.example".into(), message: "refused".into() };
    assert!(timeout.is_breaker_failure());
    assert!(connect.is_breaker_failure());
    assert!(timeout.is_retryable());
    assert!(connect.is_retryable());
}

#[test]
fn client_errors_stop_the_retry_loop() {
    assert!(!status(404).is_retryable());
    assert!(!status(403).is_retryable());
    assert!(!status(404).is_breaker_failure());
}

#[test]
fn kind_mapping_matches_the_taxonomy() {
    use scout_core::ErrorKind;
    assert_eq!(status(404).kind(), ErrorKind::NotFound);
    assert_eq!(status(403).kind(), ErrorKind::Forbidden);
    assert_eq!(status(429).kind(), ErrorKind::Transient);
    assert_eq!(status(503).kind(), ErrorKind::Transient);
    assert_eq!(
        HttpError::CircuitOpen { host: "h".into(), retry_in: Duration::ZERO }.kind(),
        ErrorKind::CircuitOpen
    );
    assert_eq!(HttpError::InvalidUrl("x".into()).kind(), ErrorKind::Parse);
}

#[test]
fn metric_kind_distinguishes_429_from_5xx() {
    assert_eq!(status(429).metric_kind(), "http_429");
    assert_eq!(status(500).metric_kind(), "http_5xx");
    assert_eq!(status(404).metric_kind(), "http_status");
}
