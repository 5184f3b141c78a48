// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic member-page parser.
//!
//! Understands the common directory shape: one heading per member with
//! an optional "City, ST" line and website link in the block below it.

use crate::extraction::{provenance, record_id, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::html::{extract_headings, extract_hrefs, find_city_state};
use crate::{agent::optional_str, agent::required_str, detect_auth_wall, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::json;

pub struct HtmlParser;

#[async_trait]
impl Agent for HtmlParser {
    fn name(&self) -> &'static str {
        "extraction.html_parser"
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

        // Auth pages are flagged, never scraped.
        if let Some(indicator) = detect_auth_wall(content) {
            tracing::warn!(url, indicator, "auth wall detected, skipping extraction");
            return Ok(json!({
                "success": false,
                "auth_required": true,
                "records": [],
                "records_processed": 0,
            }));
        }

        let headings = extract_headings(content);
        let mut records = Vec::new();

        for (i, (start, name)) in headings.iter().enumerate() {
            if name.len() < 3 || name.len() > 120 {
                continue;
            }
            let block_end = headings.get(i + 1).map(|(pos, _)| *pos).unwrap_or(content.len());
            let block = &content[*start..block_end];

            let mut record = json!({
                "id": record_id("cmp", association, name),
                "company_name": name,
                "normalized_name": scout_core::normalize_company_name(name),
                "provenance": [provenance(self.name(), url, association, ctx)],
            });
            if let Some(association) = association {
                record["associations"] = json!([association]);
            }
            if let Some((city, state)) = find_city_state(block) {
                record["city"] = json!(city);
                record["state"] = json!(state);
            }
            if let Some(website) = block_website(block) {
                record["domain"] = json!(scout_core::extract_domain(&website));
                record["website"] = json!(website);
            }
            records.push(record);
        }

        tracing::info!(url, records = records.len(), "page extracted");
        Ok(json!({
            "success": true,
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

/// First external link in a block, taken as the member's website.
fn block_website(block: &str) -> Option<String> {
    extract_hrefs(block)
        .into_iter()
        .find(|href| href.starts_with("http") && !href.contains("mailto:"))
        .map(|href| scout_core::normalize_url(&href))
}
