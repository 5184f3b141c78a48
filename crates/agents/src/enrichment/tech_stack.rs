// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tech-stack detection by fingerprinting the company website.

use crate::enrichment::{records, stamp, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::{json, Value};

/// (page marker, technology) fingerprints. ERP systems are the signals
/// the sales side cares about, so they also land in `erp_system`.
const FINGERPRINTS: [(&str, &str, bool); 10] = [
    ("wp-content", "WordPress", false),
    ("shopify", "Shopify", false),
    ("hubspot", "HubSpot", false),
    ("salesforce", "Salesforce", false),
    ("netsuite", "NetSuite", true),
    ("sap.com", "SAP", true),
    ("epicor", "Epicor", true),
    ("infor.com", "Infor", true),
    ("plex.com", "Plex", true),
    ("iqms", "IQMS", true),
];

pub struct TechStack;

#[async_trait]
impl Agent for TechStack {
    fn name(&self) -> &'static str {
        "enrichment.tech_stack"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        vec![Capability::Enricher]
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let mut records = records(&task.payload)?;
        let http = ctx.http()?;

        let mut fingerprinted = 0usize;
        for record in &mut records {
            if let Some(website) = record.get("website").and_then(Value::as_str) {
                let website = website.to_string();
                tracing::info!(website, provider = "tech_stack", "external enrichment call");
                match http.get(&website).await {
                    Ok(response) => {
                        apply_fingerprints(record, &response.body);
                        fingerprinted += 1;
                    }
                    Err(error) => {
                        tracing::debug!(website, error = %error, "website fingerprint failed");
                    }
                }
            }
            stamp(record, self.name(), ctx);
        }

        tracing::info!(total = records.len(), fingerprinted, "tech stack detection done");
        Ok(json!({
            "success": true,
            "provider": "fingerprint",
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

fn apply_fingerprints(record: &mut Value, body: &str) {
    let lowered = body.to_lowercase();
    let mut stack: Vec<String> = record
        .get("tech_stack")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    for (marker, tech, is_erp) in FINGERPRINTS {
        if lowered.contains(marker) {
            if !stack.iter().any(|t| t == tech) {
                stack.push(tech.to_string());
            }
            if is_erp && record.get("erp_system").is_none() {
                record["erp_system"] = json!(tech);
            }
        }
    }

    if !stack.is_empty() {
        record["tech_stack"] = json!(stack);
    }
}
