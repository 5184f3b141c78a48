// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant-list parser: exhibitors, sponsors, and speakers from
//! event pages.

use crate::extraction::{provenance, record_id, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::html::{extract_headings, strip_tags};
use crate::{agent::optional_str, agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::json;

/// Keywords deciding the participant type from the nearest heading.
const TYPE_HINTS: [(&str, &str); 3] =
    [("sponsor", "sponsor"), ("exhibitor", "exhibitor"), ("speaker", "speaker")];

pub struct ParticipantExtractor;

#[async_trait]
impl Agent for ParticipantExtractor {
    fn name(&self) -> &'static str {
        "extraction.event_participant_extractor"
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
        let event_id = optional_str(&task.payload, "event_id").unwrap_or("");

        let headings = extract_headings(content);
        let mut records = Vec::new();

        for (i, (start, heading)) in headings.iter().enumerate() {
            let lowered = heading.to_lowercase();
            let Some((_, participant_type)) =
                TYPE_HINTS.iter().find(|(hint, _)| lowered.contains(hint))
            else {
                continue;
            };

            let block_end = headings.get(i + 1).map(|(pos, _)| *pos).unwrap_or(content.len());
            for name in list_items(&content[*start..block_end]) {
                let mut record = json!({
                    "id": record_id("prt", association, &format!("{event_id}:{name}")),
                    "event_id": event_id,
                    "company_name": name,
                    "participant_type": participant_type,
                    "provenance": [provenance(self.name(), url, association, ctx)],
                });
                if *participant_type == "sponsor" {
                    if let Some(tier) = sponsor_tier(&lowered) {
                        record["sponsor_tier"] = json!(tier);
                    }
                }
                records.push(record);
            }
        }

        tracing::info!(url, records = records.len(), "participants extracted");
        Ok(json!({
            "success": true,
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

/// `<li>` item texts within a block.
fn list_items(block: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut offset = 0;
    while let Some(pos) = block[offset..].find("<li") {
        let start = offset + pos;
        let Some(text_start) = block[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let Some(text_end) = block[text_start..].find("</li>").map(|i| text_start + i) else {
            break;
        };
        let text = strip_tags(&block[text_start..text_end]);
        if text.len() >= 2 && text.len() <= 120 {
            items.push(text);
        }
        offset = text_end + 5;
    }
    items
}

fn sponsor_tier(heading: &str) -> Option<&'static str> {
    for tier in ["platinum", "gold", "silver", "bronze"] {
        if heading.contains(tier) {
            return Some(tier);
        }
    }
    None
}
