// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quality scoring: weighted completeness, accuracy, freshness, and
//! source reliability, mapped to a 0-100 score and a letter grade.

use crate::validation::{records, stamp, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_core::{AgentTask, QualityGrade};
use serde_json::{json, Value};

const WEIGHT_COMPLETENESS: f64 = 0.30;
const WEIGHT_ACCURACY: f64 = 0.40;
const WEIGHT_FRESHNESS: f64 = 0.15;
const WEIGHT_SOURCES: f64 = 0.15;

/// Fields whose presence drives 60% of the completeness score.
const REQUIRED_FIELDS: [&str; 4] = ["company_name", "website", "city", "state"];
/// Nice-to-have fields driving the remaining 40%.
const VALUABLE_FIELDS: [&str; 5] =
    ["employee_count_min", "erp_system", "contacts", "industry", "year_founded"];

pub struct Scorer;

#[async_trait]
impl Agent for Scorer {
    fn name(&self) -> &'static str {
        "validation.scorer"
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
        let now = ctx.clock().utc_now();

        let mut score_sum = 0u64;
        for record in &mut records {
            let completeness = completeness(record);
            let accuracy = accuracy(record);
            let freshness = freshness(record, now);
            let sources = source_reliability(record);

            let score = (completeness * WEIGHT_COMPLETENESS
                + accuracy * WEIGHT_ACCURACY
                + freshness * WEIGHT_FRESHNESS
                + sources * WEIGHT_SOURCES)
                .round()
                .clamp(0.0, 100.0) as u8;

            record["quality_score"] = json!(score);
            record["quality_grade"] = json!(QualityGrade::from_score(score));
            score_sum += score as u64;
            stamp(record, self.name(), ctx);
        }

        let average = if records.is_empty() { 0.0 } else { score_sum as f64 / records.len() as f64 };
        tracing::info!(total = records.len(), average_score = average, "scoring done");
        Ok(json!({
            "success": true,
            "records": records,
            "records_processed": records.len(),
            "average_score": average,
        }))
    }
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn completeness(record: &Value) -> f64 {
    let required = REQUIRED_FIELDS.iter().filter(|f| has_value(record.get(**f))).count();
    let valuable = VALUABLE_FIELDS.iter().filter(|f| has_value(record.get(**f))).count();
    (required as f64 / REQUIRED_FIELDS.len() as f64) * 60.0
        + (valuable as f64 / VALUABLE_FIELDS.len() as f64) * 40.0
}

/// Base 60, adjusted by the crossref findings when present.
fn accuracy(record: &Value) -> f64 {
    let Some(validation) = record.get("_validation").and_then(Value::as_object) else {
        return 60.0;
    };
    let mut score: f64 = 60.0;
    match validation.get("domain_consistent").and_then(Value::as_bool) {
        Some(true) => score += 20.0,
        Some(false) => score -= 20.0,
        None => {}
    }
    match validation.get("contact_domains_consistent").and_then(Value::as_bool) {
        Some(true) => score += 15.0,
        Some(false) => score -= 10.0,
        None => {}
    }
    if validation.get("state_plausible").and_then(Value::as_bool) == Some(false) {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0)
}

/// Age of the newest provenance entry, bucketed.
fn freshness(record: &Value, now: DateTime<Utc>) -> f64 {
    let newest = record
        .get("provenance")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("extracted_at").and_then(Value::as_str))
        .filter_map(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .max();

    let Some(newest) = newest else {
        return 50.0;
    };
    let days_old = (now - newest).num_days();
    match days_old {
        i64::MIN..=7 => 100.0,
        8..=30 => 90.0,
        31..=90 => 75.0,
        91..=180 => 60.0,
        181..=365 => 40.0,
        _ => 20.0,
    }
}

/// More distinct provenance sources mean higher confidence.
fn source_reliability(record: &Value) -> f64 {
    let sources: std::collections::BTreeSet<&str> = record
        .get("provenance")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("extracted_by").and_then(Value::as_str))
        .collect();

    if sources.is_empty() {
        return 50.0;
    }
    let base = 60.0;
    let bonus = (sources.len() as f64 * 2.0).min(10.0);
    (base + bonus).min(100.0)
}
