// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

const AGENT: &str = "extraction.html_parser";

fn attributed_record(id: &str) -> Value {
    json!({
        "id": id,
        "provenance": [{
            "source_url": "https://pma.example/a",
            "extracted_at": "2026-03-01T12:00:00Z",
            "extracted_by": AGENT
        }]
    })
}

#[test]
fn attributed_records_pass() {
    let output = json!({ "success": true, "records": [attributed_record("cmp-1")] });
    assert!(check_provenance(AGENT, &output).is_ok());
}

#[test]
fn missing_provenance_is_a_violation() {
    let output = json!({ "success": true, "records": [{"id": "cmp-1"}] });
    let violation = check_provenance(AGENT, &output).unwrap_err();
    assert_eq!(violation.policy, "provenance_required");
    assert!(violation.message.contains("records[0]"));
}

#[test]
fn empty_provenance_is_a_violation() {
    let output = json!({ "success": true, "records": [{"id": "cmp-1", "provenance": []}] });
    assert!(check_provenance(AGENT, &output).is_err());
}

#[test]
fn provenance_must_reference_the_producing_agent() {
    let output = json!({
        "success": true,
        "records": [{
            "id": "cmp-1",
            "provenance": [{
                "source_url": "https://pma.example/a",
                "extracted_at": "2026-03-01T12:00:00Z",
                "extracted_by": "someone.else"
            }]
        }]
    });
    let violation = check_provenance(AGENT, &output).unwrap_err();
    assert!(violation.message.contains("does not reference"));
}

#[test]
fn unidentified_entries_are_ignored() {
    // Objects without an id (e.g. raw links) are not records.
    let output = json!({ "success": true, "records": [{"url": "https://pma.example"}] });
    assert!(check_provenance(AGENT, &output).is_ok());
}

#[test]
fn signals_field_is_checked_too() {
    let output = json!({ "success": true, "signals": [{"id": "sig-1", "provenance": []}] });
    assert!(check_provenance(AGENT, &output).is_err());
}

#[test]
fn outputs_without_record_fields_pass() {
    let output = json!({ "success": true, "page_type": "OTHER" });
    assert!(check_provenance(AGENT, &output).is_ok());
}

#[test]
fn auth_wall_detection_is_case_insensitive() {
    assert_eq!(detect_auth_wall("<p>Members Only area</p>"), Some("members only"));
    assert_eq!(detect_auth_wall("<p>Please LOG IN to continue</p>"), Some("please log in"));
    assert_eq!(detect_auth_wall("<p>welcome to our directory</p>"), None);
}
