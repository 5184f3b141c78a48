// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Competitor signal mining over company pages.

use crate::intelligence::{INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{agent::optional_str, agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::json;

/// Competitor products watched for in page text.
const COMPETITORS: [&str; 8] =
    ["NetSuite", "Epicor", "Infor", "Plex", "IQMS", "Acumatica", "Odoo", "Global Shop"];

/// Characters of context captured around a mention.
const CONTEXT_WINDOW: usize = 60;

pub struct SignalMiner;

#[async_trait]
impl Agent for SignalMiner {
    fn name(&self) -> &'static str {
        "intelligence.competitor_signal_miner"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        vec![Capability::Crawler]
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let url = required_str(&task.payload, "url")?;
        let source_company_id = optional_str(&task.payload, "source_company_id");

        // Use provided content when the page was already fetched.
        let content = match optional_str(&task.payload, "content") {
            Some(content) => content.to_string(),
            None => ctx.http()?.get(url).await?.body,
        };
        let lowered = content.to_lowercase();

        let mut signals = Vec::new();
        for competitor in COMPETITORS {
            let needle = competitor.to_lowercase();
            let Some(pos) = lowered.find(&needle) else {
                continue;
            };
            let start = pos.saturating_sub(CONTEXT_WINDOW);
            let end = (pos + needle.len() + CONTEXT_WINDOW).min(content.len());
            let context: String = content
                .get(start..end)
                .unwrap_or("")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            let mut signal = json!({
                "id": format!(
                    "sig-{}",
                    &scout_core::content_hash(&format!("{url}:{competitor}"))[..16]
                ),
                "competitor_name": competitor,
                "signal_type": "product_mention",
                "context": context,
                "confidence": 0.8,
                "provenance": [{
                    "source_url": url,
                    "extracted_at": ctx.clock().utc_now().to_rfc3339(),
                    "extracted_by": self.name(),
                    "job_id": ctx.job_id().to_string(),
                }],
            });
            if let Some(company_id) = source_company_id {
                signal["source_company_id"] = json!(company_id);
            }
            signals.push(signal);
        }

        tracing::debug!(url, signals = signals.len(), "signal mining done");
        Ok(json!({
            "success": true,
            "signals": signals,
            "records_processed": signals.len(),
        }))
    }
}
