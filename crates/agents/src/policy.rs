// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy middleware predicates.
//!
//! Enforced rules:
//! - provenance: every identified record in an agent's output carries a
//!   non-empty provenance list naming the producing agent
//! - crawler-class: only crawlers and enrichers touch the network
//!   (enforced structurally by [`AgentContext::http`](crate::AgentContext::http))
//! - auth-flagging: authenticated pages are annotated, never extracted
//! - output-schema: composed with the contract validator in strict mode
//!
//! Violations surface before the agent's output is merged; the executor
//! counts them and treats the invocation as a skippable failure.

use serde_json::Value;
use thiserror::Error;

/// A policy rule rejection.
#[derive(Debug, Clone, Error)]
#[error("policy violation [{policy}] by {agent}: {message}")]
pub struct PolicyViolation {
    pub policy: &'static str,
    pub agent: String,
    pub message: String,
}

/// Content phrases marking login walls and paywalls.
pub const AUTH_INDICATORS: [&str; 11] = [
    "please log in",
    "sign in to view",
    "members only",
    "login required",
    "authentication required",
    "access denied",
    "subscription required",
    "premium content",
    "you must be logged in",
    "register to view",
    "create an account",
];

/// Scan page content for an authentication indicator.
pub fn detect_auth_wall(content: &str) -> Option<&'static str> {
    let lowered = content.to_lowercase();
    AUTH_INDICATORS.iter().find(|phrase| lowered.contains(*phrase)).copied()
}

/// Output fields that hold identified record lists.
const RECORD_FIELDS: [&str; 2] = ["records", "signals"];

/// Check the provenance rule over an agent's output document.
///
/// Every object with an `id` inside a record-bearing field must carry a
/// non-empty `provenance` array with at least one entry attributed to the
/// producing agent (`extracted_by` equals the agent name).
pub fn check_provenance(agent_name: &str, output: &Value) -> Result<(), PolicyViolation> {
    for field in RECORD_FIELDS {
        let Some(records) = output.get(field).and_then(Value::as_array) else {
            continue;
        };
        for (i, record) in records.iter().enumerate() {
            let Some(obj) = record.as_object() else {
                continue;
            };
            if !obj.contains_key("id") {
                continue;
            }

            let entries = obj.get("provenance").and_then(Value::as_array);
            let Some(entries) = entries.filter(|e| !e.is_empty()) else {
                return Err(PolicyViolation {
                    policy: "provenance_required",
                    agent: agent_name.to_string(),
                    message: format!("{field}[{i}] has no provenance"),
                });
            };

            let attributed = entries.iter().any(|entry| {
                entry.get("extracted_by").and_then(Value::as_str) == Some(agent_name)
            });
            if !attributed {
                return Err(PolicyViolation {
                    policy: "provenance_required",
                    agent: agent_name.to_string(),
                    message: format!("{field}[{i}] provenance does not reference {agent_name}"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
