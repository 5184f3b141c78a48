// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{InvocationId, JobId};

#[test]
fn generated_ids_have_prefix_and_fixed_length() {
    let id = JobId::new();
    assert!(id.as_str().starts_with("job-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn generated_ids_are_unique() {
    let a = JobId::new();
    let b = JobId::new();
    assert_ne!(a, b);
}

#[test]
fn from_string_round_trips() {
    let id = InvocationId::from_string("inv-abc123");
    assert_eq!(id.as_str(), "inv-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn suffix_without_prefix_returns_whole_id() {
    let id = JobId::from_string("custom-id");
    assert_eq!(id.suffix(), "custom-id");
}

#[test]
fn short_truncates() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}

#[test]
fn id_serde_is_transparent() {
    let id = JobId::from_string("job-x1");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"job-x1\"");
    let back: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn idbuf_borrow_matches_str_hash() {
    use std::collections::HashMap;
    let mut map: HashMap<JobId, u32> = HashMap::new();
    map.insert(JobId::from_string("job-a"), 1);
    // Borrow<str> lookup
    assert_eq!(map.get("job-a"), Some(&1));
}
