// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation agents: dedupe, cross-reference, scoring, and entity
//! resolution over the extracted company set.

mod crossref;
mod dedupe;
mod entity_resolver;
mod scorer;
mod similarity;

pub use crossref::CrossRef;
pub use dedupe::Dedupe;
pub use entity_resolver::EntityResolver;
pub use scorer::Scorer;
pub use similarity::{match_score, name_similarity};

use crate::{AgentContext, AgentError};
use serde_json::{json, Value};

pub(crate) const INPUT_SCHEMA: &str = "https://contracts.scout.dev/validation/input.json";
pub(crate) const OUTPUT_SCHEMA: &str = "https://contracts.scout.dev/validation/output.json";

pub(crate) fn records(payload: &Value) -> Result<Vec<Value>, AgentError> {
    payload
        .get("records")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| AgentError::Payload("missing records array".to_string()))
}

/// Append this agent's provenance entry to a record.
pub(crate) fn stamp(record: &mut Value, agent_name: &str, ctx: &AgentContext) {
    let entry = json!({
        "source_url": "validation:pipeline",
        "extracted_at": ctx.clock().utc_now().to_rfc3339(),
        "extracted_by": agent_name,
        "job_id": ctx.job_id().to_string(),
    });
    match record.get_mut("provenance").and_then(Value::as_array_mut) {
        Some(entries) => entries.push(entry),
        None => record["provenance"] = json!([entry]),
    }
}
