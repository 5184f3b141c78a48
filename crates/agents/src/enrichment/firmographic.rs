// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Firmographic enrichment: employee counts, founding year, industry.

use crate::enrichment::{records, stamp, FIRMOGRAPHIC_KEY, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::{json, Value};

const PROVIDER_URL: &str = "https://company.clearbit.example/v2/companies/find";

pub struct Firmographic;

#[async_trait]
impl Agent for Firmographic {
    fn name(&self) -> &'static str {
        "enrichment.firmographic"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        vec![Capability::Enricher, Capability::Secret(FIRMOGRAPHIC_KEY.to_string())]
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let mut records = records(&task.payload)?;

        // Optional key: absent means pass-through, not failure.
        if !ctx.secrets().present(FIRMOGRAPHIC_KEY) {
            tracing::warn!(key = FIRMOGRAPHIC_KEY, "enrichment key absent, passing through");
            for record in &mut records {
                stamp(record, self.name(), ctx);
            }
            return Ok(json!({
                "success": true,
                "provider": "none",
                "records_processed": records.len(),
                "records": records,
            }));
        }

        let http = ctx.http()?;
        let mut enriched = 0usize;
        for record in &mut records {
            if let Some(domain) = record.get("domain").and_then(Value::as_str) {
                let lookup = format!("{PROVIDER_URL}?domain={domain}");
                tracing::info!(domain, provider = "firmographic", "external enrichment call");
                match http.get(&lookup).await {
                    Ok(response) => {
                        if let Ok(data) = serde_json::from_str::<Value>(&response.body) {
                            apply_firmographics(record, &data);
                            enriched += 1;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(domain, error = %error, "firmographic lookup failed");
                    }
                }
            }
            stamp(record, self.name(), ctx);
        }

        tracing::info!(total = records.len(), enriched, "firmographic enrichment done");
        Ok(json!({
            "success": true,
            "provider": "clearbit",
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

/// Copy provider fields onto the record, never overwriting extracted data.
fn apply_firmographics(record: &mut Value, data: &Value) {
    for (provider_field, record_field) in [
        ("employees_min", "employee_count_min"),
        ("employees_max", "employee_count_max"),
        ("founded_year", "year_founded"),
    ] {
        if record.get(record_field).is_none() {
            if let Some(value) = data.get(provider_field).and_then(Value::as_u64) {
                record[record_field] = json!(value);
            }
        }
    }
    if record.get("industry").is_none() {
        if let Some(industry) = data.get("industry").and_then(Value::as_str) {
            record["industry"] = json!(industry);
        }
    }
}
