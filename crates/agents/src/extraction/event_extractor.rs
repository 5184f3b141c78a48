// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-page parser: one event per heading, with best-effort year and
//! location pulled from the heading block.

use crate::extraction::{provenance, record_id, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::html::{extract_headings, find_city_state, strip_tags};
use crate::{agent::optional_str, agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::json;

pub struct EventExtractor;

#[async_trait]
impl Agent for EventExtractor {
    fn name(&self) -> &'static str {
        "extraction.event_extractor"
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
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let url = required_str(&task.payload, "url")?;
        let content = required_str(&task.payload, "content")?;
        let association = optional_str(&task.payload, "association");

        let headings = extract_headings(content);
        let mut records = Vec::new();

        for (i, (start, title)) in headings.iter().enumerate() {
            if title.len() < 4 || title.len() > 160 {
                continue;
            }
            let block_end = headings.get(i + 1).map(|(pos, _)| *pos).unwrap_or(content.len());
            let raw_block = &content[*start..block_end];
            let block = strip_tags(raw_block);

            let mut record = json!({
                "id": record_id("evt", association, title),
                "title": title,
                "event_url": url,
                "provenance": [provenance(self.name(), url, association, ctx)],
            });
            if let Some(association) = association {
                record["organizer_association"] = json!(association);
            }
            if let Some(year) = find_year(&block) {
                record["year"] = json!(year);
            }
            if let Some((city, _state)) = find_city_state(raw_block) {
                record["city"] = json!(city);
            }
            records.push(record);
        }

        tracing::info!(url, records = records.len(), "events extracted");
        Ok(json!({
            "success": true,
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

/// First plausible 19xx/20xx year in a block.
fn find_year(text: &str) -> Option<u16> {
    let bytes = text.as_bytes();
    for window in bytes.windows(4) {
        if window.iter().all(u8::is_ascii_digit) {
            let year: u16 = std::str::from_utf8(window).ok()?.parse().ok()?;
            if (1990..=2040).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}
