// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enrichment agents: third-party lookups layered onto extracted
//! companies.
//!
//! Provider payload shapes are adapter details; each agent degrades to a
//! pass-through when its (optional) API key is absent. Every record an
//! enrichment agent returns carries a fresh provenance entry naming the
//! agent, whether or not the provider added anything.

mod contact_finder;
mod firmographic;
mod tech_stack;

pub use contact_finder::ContactFinder;
pub use firmographic::Firmographic;
pub use tech_stack::TechStack;

use crate::{AgentContext, AgentError};
use serde_json::{json, Value};

pub(crate) const INPUT_SCHEMA: &str = "https://contracts.scout.dev/enrichment/input.json";
pub(crate) const OUTPUT_SCHEMA: &str = "https://contracts.scout.dev/enrichment/output.json";

/// Secret keys for the enrichment providers.
pub const FIRMOGRAPHIC_KEY: &str = "CLEARBIT_API_KEY";
pub const CONTACTS_KEY: &str = "APOLLO_API_KEY";

/// Pull the `records` array out of an enrichment payload.
pub(crate) fn records(payload: &Value) -> Result<Vec<Value>, AgentError> {
    payload
        .get("records")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| AgentError::Payload("missing records array".to_string()))
}

/// Append this agent's provenance entry to a record.
pub(crate) fn stamp(record: &mut Value, agent_name: &str, ctx: &AgentContext) {
    let source_url = record
        .get("website")
        .and_then(Value::as_str)
        .unwrap_or("enrichment:provider")
        .to_string();
    let entry = json!({
        "source_url": source_url,
        "extracted_at": ctx.clock().utc_now().to_rfc3339(),
        "extracted_by": agent_name,
        "job_id": ctx.job_id().to_string(),
    });
    match record.get_mut("provenance").and_then(Value::as_array_mut) {
        Some(entries) => entries.push(entry),
        None => record["provenance"] = json!([entry]),
    }
}
