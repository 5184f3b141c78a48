// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extraction agents: structured records out of fetched page content.
//!
//! Extractors never fetch; they receive the page content in the payload.
//! Real site-specific parsers register alongside these generic ones.

mod event_extractor;
mod html_parser;
mod participant_extractor;

pub use event_extractor::EventExtractor;
pub use html_parser::HtmlParser;
pub use participant_extractor::ParticipantExtractor;

use crate::AgentContext;
use serde_json::json;

pub(crate) const INPUT_SCHEMA: &str = "https://contracts.scout.dev/extraction/input.json";
pub(crate) const OUTPUT_SCHEMA: &str = "https://contracts.scout.dev/extraction/output.json";

/// Deterministic record id: same association + name always yields the
/// same id, so re-extraction updates rather than duplicates.
pub(crate) fn record_id(prefix: &str, association: Option<&str>, name: &str) -> String {
    let normalized = scout_core::normalize_company_name(name);
    let seed = format!("{}:{normalized}", association.unwrap_or(""));
    format!("{prefix}-{}", &scout_core::content_hash(&seed)[..16])
}

/// Provenance entry naming the producing agent.
pub(crate) fn provenance(
    agent_name: &str,
    source_url: &str,
    association: Option<&str>,
    ctx: &AgentContext,
) -> serde_json::Value {
    let mut entry = json!({
        "source_url": source_url,
        "extracted_at": ctx.clock().utc_now().to_rfc3339(),
        "extracted_by": agent_name,
        "job_id": ctx.job_id().to_string(),
    });
    if let Some(association) = association {
        entry["association"] = json!(association);
    }
    entry
}
