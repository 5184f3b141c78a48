// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page classifier: labels a fetched page and recommends an extractor.
//!
//! Works on the already-fetched content; classification never refetches.

use crate::discovery::{INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::json;

/// (url fragment, page type, extractor) rules, first match wins.
/// URL evidence outranks content evidence.
const URL_RULES: [(&str, &str, &str); 6] = [
    ("/event", "EVENTS_LIST", "extraction.event_extractor"),
    ("/exhibitor", "PARTICIPANTS_LIST", "extraction.event_participant_extractor"),
    ("/sponsor", "PARTICIPANTS_LIST", "extraction.event_participant_extractor"),
    ("/member", "MEMBER_DIRECTORY", "extraction.html_parser"),
    ("/directory", "MEMBER_DIRECTORY", "extraction.html_parser"),
    ("/profile", "MEMBER_DETAIL", "extraction.html_parser"),
];

/// (content keyword, page type, extractor) fallback rules.
const CONTENT_RULES: [(&str, &str, &str); 4] = [
    ("upcoming events", "EVENTS_LIST", "extraction.event_extractor"),
    ("exhibitor list", "PARTICIPANTS_LIST", "extraction.event_participant_extractor"),
    ("member directory", "MEMBER_DIRECTORY", "extraction.html_parser"),
    ("our members", "MEMBER_DIRECTORY", "extraction.html_parser"),
];

pub struct PageClassifier;

#[async_trait]
impl Agent for PageClassifier {
    fn name(&self) -> &'static str {
        "discovery.page_classifier"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    async fn execute(
        &self,
        task: &AgentTask,
        _ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let url = required_str(&task.payload, "url")?;
        let content = task
            .payload
            .get("content")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let url_lowered = url.to_lowercase();

        let classified = URL_RULES
            .iter()
            .find(|(fragment, _, _)| url_lowered.contains(fragment))
            .or_else(|| CONTENT_RULES.iter().find(|(keyword, _, _)| content.contains(keyword)));

        let (page_type, extractor) = match classified {
            Some((_, page_type, extractor)) => (*page_type, *extractor),
            None => ("OTHER", "extraction.html_parser"),
        };

        tracing::debug!(url, page_type, "page classified");
        Ok(json!({
            "success": true,
            "page_type": page_type,
            "recommended_extractor": extractor,
        }))
    }
}
