// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn classification_partitions_are_disjoint() {
    let all = [
        ErrorKind::Transient,
        ErrorKind::NotFound,
        ErrorKind::Forbidden,
        ErrorKind::Parse,
        ErrorKind::SchemaViolation,
        ErrorKind::CircuitOpen,
        ErrorKind::Config,
        ErrorKind::Internal,
    ];
    for kind in all {
        let buckets =
            [kind.is_retryable(), kind.is_skippable(), kind.is_fatal()].iter().filter(|b| **b).count();
        assert_eq!(buckets, 1, "{kind} must fall in exactly one class");
    }
}

#[test]
fn transient_is_the_only_retryable() {
    assert!(ErrorKind::Transient.is_retryable());
    assert!(!ErrorKind::CircuitOpen.is_retryable());
    assert!(!ErrorKind::NotFound.is_retryable());
}

#[test]
fn config_and_internal_are_fatal() {
    assert!(ErrorKind::Config.is_fatal());
    assert!(ErrorKind::Internal.is_fatal());
    assert!(!ErrorKind::SchemaViolation.is_fatal());
}

#[test]
fn display_uses_snake_case() {
    assert_eq!(ErrorKind::SchemaViolation.to_string(), "schema_violation");
    assert_eq!(ErrorKind::CircuitOpen.to_string(), "circuit_open");
}
