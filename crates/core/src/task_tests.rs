// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn next_attempt_increments_only_attempt() {
    let task = AgentTask::new("discovery.site_mapper", json!({"url": "https://a.example"}));
    let retry = task.next_attempt();
    assert_eq!(retry.attempt, 2);
    assert_eq!(retry.agent_type, task.agent_type);
    assert_eq!(retry.payload, task.payload);
    assert_eq!(retry.deadline, task.deadline);
}

#[test]
fn task_key_prefers_url_then_domain_then_id() {
    let by_url = AgentTask::new("x", json!({"url": "https://a.example", "id": "z"}));
    assert_eq!(by_url.task_key(), "https://a.example");

    let by_domain = AgentTask::new("x", json!({"domain": "a.example"}));
    assert_eq!(by_domain.task_key(), "a.example");

    let by_id = AgentTask::new("x", json!({"id": "cmp-7"}));
    assert_eq!(by_id.task_key(), "cmp-7");

    let fallback = AgentTask::new("validation.dedupe", json!({"records": []}));
    assert_eq!(fallback.task_key(), "validation.dedupe#1");
}

#[test]
fn deadline_serializes_as_millis() {
    let task = AgentTask::new("x", json!({})).with_deadline(Duration::from_secs(2));
    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["deadline"], 2000);
    let back: AgentTask = serde_json::from_value(value).unwrap();
    assert_eq!(back.deadline, Duration::from_secs(2));
}

#[test]
fn delta_is_empty_only_without_records() {
    let mut delta = Delta::default();
    assert!(delta.is_empty());
    delta.new_records.push(json!({"id": "cmp-1"}));
    assert!(!delta.is_empty());
}
