// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn delay_grows_exponentially_and_caps() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(0), Duration::from_secs(2));
    assert_eq!(policy.delay_for(1), Duration::from_secs(4));
    assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    assert_eq!(policy.delay_for(10), Duration::from_secs(60));
}

#[test]
fn jitter_stays_within_one_base_interval() {
    let policy = RetryPolicy::default();
    for attempt in 0..4 {
        let bare = policy.delay_for(attempt);
        for _ in 0..50 {
            let jittered = policy.jittered_delay(attempt);
            assert!(jittered >= bare, "jitter must not shrink the delay");
            assert!(jittered < bare + policy.base, "jitter bounded by base");
        }
    }
}

#[test]
fn max_attempts_counts_the_first_try() {
    let policy = RetryPolicy { max_retries: 3, ..RetryPolicy::default() };
    assert_eq!(policy.max_attempts(), 4);
}
