// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn config(default_rate: f64, per_host: &[(&str, f64)]) -> RateLimitConfig {
    RateLimitConfig {
        default_rate,
        per_host: per_host.iter().map(|(h, r)| (h.to_string(), *r)).collect(),
    }
}

#[test]
fn rate_lookup_prefers_exact_then_suffix_then_default() {
    let config = config(1.0, &[("pma.example", 0.5), ("clearbit.example", 10.0)]);
    assert_eq!(config.rate_for("pma.example"), 0.5);
    assert_eq!(config.rate_for("members.pma.example"), 0.5);
    assert_eq!(config.rate_for("clearbit.example"), 10.0);
    assert_eq!(config.rate_for("unknown.example"), 1.0);
}

#[test]
fn suffix_matching_requires_a_label_boundary() {
    let config = config(1.0, &[("ma.example", 0.25)]);
    // "pma.example" must NOT inherit "ma.example"'s rate
    assert_eq!(config.rate_for("pma.example"), 1.0);
    assert_eq!(config.rate_for("x.ma.example"), 0.25);
}

#[tokio::test(start_paused = true)]
async fn burst_up_to_capacity_then_throttled() {
    let limiter = RateLimiter::new(config(2.0, &[]));
    let start = Instant::now();

    // Capacity is ceil(2.0) = 2: two immediate tokens.
    limiter.acquire("h.example").await;
    limiter.acquire("h.example").await;
    assert_eq!(Instant::now().duration_since(start), Duration::ZERO);

    // Third token must wait ~0.5s at 2/s.
    limiter.acquire("h.example").await;
    let elapsed = Instant::now().duration_since(start);
    assert!(elapsed >= Duration::from_millis(490), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn sustained_rate_is_bounded() {
    let limiter = RateLimiter::new(config(2.0, &[]));
    let start = Instant::now();
    for _ in 0..10 {
        limiter.acquire("h.example").await;
    }
    // 10 tokens at 2/s with capacity 2: at least (10-2)/2 = 4s.
    let elapsed = Instant::now().duration_since(start);
    assert!(elapsed >= Duration::from_secs(4), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn hosts_do_not_share_buckets() {
    let limiter = RateLimiter::new(config(1.0, &[]));
    let start = Instant::now();
    limiter.acquire("a.example").await;
    limiter.acquire("b.example").await;
    limiter.acquire("c.example").await;
    assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn waiters_are_served_in_fifo_order() {
    use std::sync::Arc;
    let limiter = Arc::new(RateLimiter::new(config(1.0, &[])));
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    // Drain the initial token.
    limiter.acquire("h.example").await;

    let mut handles = Vec::new();
    for i in 0..3 {
        let limiter = limiter.clone();
        let order = order.clone();
        handles.push(tokio::spawn(async move {
            limiter.acquire("h.example").await;
            order.lock().push(i);
        }));
        // Let the spawned task reach the queue before spawning the next.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(*order.lock(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_waiter_releases_the_queue() {
    use std::sync::Arc;
    let limiter = Arc::new(RateLimiter::new(config(1.0, &[])));
    limiter.acquire("h.example").await;

    let blocked = {
        let limiter = limiter.clone();
        tokio::spawn(async move {
            limiter.acquire("h.example").await;
        })
    };
    tokio::task::yield_now().await;
    blocked.abort();
    let _ = blocked.await;

    // The aborted waiter must not strand the bucket.
    limiter.acquire("h.example").await;
}
