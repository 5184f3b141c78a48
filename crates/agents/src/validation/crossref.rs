// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-reference checks: internal consistency between a record's
//! name, website, and contacts.
//!
//! The external lookups the enrichment side does (DNS, places APIs) are
//! provider adapters; this agent covers the offline half and records its
//! findings under `_validation` for the scorer.

use crate::validation::{records, stamp, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::{json, Value};

pub struct CrossRef;

#[async_trait]
impl Agent for CrossRef {
    fn name(&self) -> &'static str {
        "validation.crossref"
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
        let mut records = records(&task.payload)?;

        let mut flagged = 0usize;
        for record in &mut records {
            let mut checks = serde_json::Map::new();

            // Domain derived from website must agree with the domain field.
            let website_domain = record
                .get("website")
                .and_then(Value::as_str)
                .map(scout_core::extract_domain)
                .filter(|d| !d.is_empty());
            if let Some(website_domain) = &website_domain {
                match record.get("domain").and_then(Value::as_str) {
                    Some(domain) if !domain.is_empty() => {
                        checks.insert(
                            "domain_consistent".to_string(),
                            json!(domain == website_domain),
                        );
                    }
                    _ => {
                        record["domain"] = json!(website_domain);
                        checks.insert("domain_consistent".to_string(), json!(true));
                    }
                }
            }

            // Contact email domains should match the company domain;
            // mismatches lose confidence.
            if let Some(domain) =
                record.get("domain").and_then(Value::as_str).map(str::to_string)
            {
                let mut mismatched = 0;
                if let Some(contacts) = record.get_mut("contacts").and_then(Value::as_array_mut) {
                    for contact in contacts {
                        let Some(email) = contact.get("email").and_then(Value::as_str) else {
                            continue;
                        };
                        let email_domain = email.rsplit('@').next().unwrap_or("").to_lowercase();
                        if !email_domain.is_empty() && email_domain != domain {
                            mismatched += 1;
                            let confidence =
                                contact.get("confidence").and_then(Value::as_f64).unwrap_or(0.5);
                            contact["confidence"] = json!(confidence * 0.5);
                        }
                    }
                }
                checks.insert("contact_domains_consistent".to_string(), json!(mismatched == 0));
            }

            // State codes are two letters.
            if let Some(state) = record.get("state").and_then(Value::as_str) {
                checks.insert(
                    "state_plausible".to_string(),
                    json!(state.len() == 2 && state.chars().all(|c| c.is_ascii_uppercase())),
                );
            }

            let all_consistent = checks.values().all(|v| v.as_bool().unwrap_or(true));
            if !all_consistent {
                flagged += 1;
            }
            record["_validation"] = Value::Object(checks);
            stamp(record, self.name(), ctx);
        }

        tracing::info!(total = records.len(), flagged, "cross-reference checks done");
        Ok(json!({
            "success": true,
            "records": records,
            "records_processed": records.len(),
        }))
    }
}
