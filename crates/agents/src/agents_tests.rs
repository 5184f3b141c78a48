// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavior tests for the built-in agents, run against the scripted
//! transport.

use crate::discovery::{AccessGatekeeper, LinkCrawler, PageClassifier};
use crate::extraction::HtmlParser;
use crate::validation::{Dedupe, EntityResolver, Scorer};
use crate::{check_provenance, Agent, AgentContext, SecretStore};
use scout_core::{AgentTask, FakeClock, JobId, Metrics};
use scout_http::{HttpCore, RateLimitConfig, Response, ScriptedTransport};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    ctx: AgentContext,
    transport: Arc<ScriptedTransport>,
}

fn harness() -> Harness {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = FakeClock::new();
    let http = HttpCore::builder()
        .rate_config(RateLimitConfig { default_rate: 1000.0, per_host: HashMap::new() })
        .transport(transport.clone())
        .metrics(Metrics::new())
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap();
    let secrets = SecretStore::new(Vec::new(), Duration::from_secs(300), Arc::new(clock.clone()));
    let ctx = AgentContext::builder()
        .http(Arc::new(http))
        .secrets(Arc::new(secrets))
        .clock(Arc::new(clock))
        .job_id(JobId::from_string("job-agents-test"))
        .build()
        .unwrap();
    Harness { ctx, transport }
}

async fn run(agent: &dyn Agent, harness: &Harness, payload: Value) -> Value {
    let task = AgentTask::new(agent.name(), payload);
    let ctx = harness.ctx.for_agent(agent);
    agent.execute(&task, &ctx).await.unwrap()
}

// --- gatekeeper ---

#[tokio::test(start_paused = true)]
async fn gatekeeper_allows_a_benign_domain() {
    let h = harness();
    h.transport.push("pma.example", Ok(Response::ok("User-agent: *\nDisallow: /private")));
    h.transport.push("pma.example", Ok(Response::ok("<html>Welcome to PMA</html>")));

    let output = run(&AccessGatekeeper, &h, json!({"domain": "pma.example"})).await;
    assert_eq!(output["verdict"]["allowed"], true);
    assert_eq!(output["verdict"]["domain"], "pma.example");
}

#[tokio::test(start_paused = true)]
async fn gatekeeper_blocks_robots_disallow_all() {
    let h = harness();
    h.transport.push("closed.example", Ok(Response::ok("User-agent: *\nDisallow: /")));

    let output = run(&AccessGatekeeper, &h, json!({"domain": "closed.example"})).await;
    assert_eq!(output["verdict"]["allowed"], false);
    let restrictions = output["verdict"]["restrictions"].as_array().unwrap();
    assert!(restrictions.iter().any(|r| r.as_str().unwrap().contains("disallows all")));
    // No homepage check once robots already blocked the domain.
    assert_eq!(h.transport.call_count("closed.example"), 1);
}

#[tokio::test(start_paused = true)]
async fn gatekeeper_flags_auth_walled_homepage() {
    let h = harness();
    h.transport.push("walled.example", Ok(Response::ok("")));
    h.transport.push("walled.example", Ok(Response::ok("<p>Members only. Please log in.</p>")));

    let output = run(&AccessGatekeeper, &h, json!({"domain": "walled.example"})).await;
    assert_eq!(output["verdict"]["allowed"], false);
}

#[tokio::test(start_paused = true)]
async fn gatekeeper_treats_missing_robots_as_unrestricted() {
    let h = harness();
    h.transport.push(
        "norobots.example",
        Err(scout_http::HttpError::Status { host: "norobots.example".into(), status: 404 }),
    );
    h.transport.push("norobots.example", Ok(Response::ok("<html>fine</html>")));

    let output = run(&AccessGatekeeper, &h, json!({"domain": "norobots.example"})).await;
    assert_eq!(output["verdict"]["allowed"], true);
}

// --- link crawler ---

#[tokio::test(start_paused = true)]
async fn link_crawler_returns_same_origin_links_and_snapshot() {
    let h = harness();
    h.transport.push(
        "pma.example",
        Ok(Response::ok(
            r#"<a href="/members/a">A</a>
               <a href="https://pma.example/members/b">B</a>
               <a href="https://elsewhere.example/x">offsite</a>
               <a href="/members/a">dup</a>"#,
        )),
    );

    let output =
        run(&LinkCrawler, &h, json!({"url": "https://pma.example/members", "association": "pma"}))
            .await;
    let links: Vec<&str> =
        output["links"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    assert_eq!(links, vec!["https://pma.example/members/a", "https://pma.example/members/b"]);

    let page = &output["page"];
    assert_eq!(page["status_code"], 200);
    assert_eq!(page["auth_required"], false);
    assert_eq!(page["association"], "pma");
    assert_eq!(page["content_hash"].as_str().unwrap().len(), 64);
}

// --- page classifier ---

#[tokio::test]
async fn classifier_prefers_url_evidence() {
    let h = harness();
    let output = run(
        &PageClassifier,
        &h,
        json!({"url": "https://pma.example/events/2026", "content": "our members are great"}),
    )
    .await;
    assert_eq!(output["page_type"], "EVENTS_LIST");
    assert_eq!(output["recommended_extractor"], "extraction.event_extractor");
}

#[tokio::test]
async fn classifier_falls_back_to_content_then_other() {
    let h = harness();
    let by_content = run(
        &PageClassifier,
        &h,
        json!({"url": "https://pma.example/page", "content": "Browse the member directory below"}),
    )
    .await;
    assert_eq!(by_content["page_type"], "MEMBER_DIRECTORY");

    let unknown =
        run(&PageClassifier, &h, json!({"url": "https://pma.example/page", "content": "hello"}))
            .await;
    assert_eq!(unknown["page_type"], "OTHER");
    assert_eq!(unknown["recommended_extractor"], "extraction.html_parser");
}

// --- html parser ---

const DIRECTORY_PAGE: &str = r#"
<h2>Acme Manufacturing, Inc.</h2>
<p>Cleveland, OH 44101</p>
<a href="https://acme.example">Website</a>
<h2>Basso Industries LLC</h2>
<p>Toledo, OH</p>
"#;

#[tokio::test]
async fn html_parser_extracts_members_with_provenance() {
    let h = harness();
    let output = run(
        &HtmlParser,
        &h,
        json!({"url": "https://pma.example/members", "content": DIRECTORY_PAGE, "association": "pma"}),
    )
    .await;

    assert_eq!(output["success"], true);
    let records = output["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["company_name"], "Acme Manufacturing, Inc.");
    assert_eq!(records[0]["city"], "Cleveland");
    assert_eq!(records[0]["state"], "OH");
    assert_eq!(records[0]["domain"], "acme.example");
    assert_eq!(records[0]["associations"][0], "pma");

    // The provenance policy holds for parser output.
    check_provenance("extraction.html_parser", &output).unwrap();
}

#[tokio::test]
async fn html_parser_ids_are_stable_across_runs() {
    let h = harness();
    let payload =
        json!({"url": "https://pma.example/members", "content": DIRECTORY_PAGE, "association": "pma"});
    let first = run(&HtmlParser, &h, payload.clone()).await;
    let second = run(&HtmlParser, &h, payload).await;
    assert_eq!(first["records"][0]["id"], second["records"][0]["id"]);
}

#[tokio::test]
async fn html_parser_flags_auth_pages_instead_of_scraping() {
    let h = harness();
    let output = run(
        &HtmlParser,
        &h,
        json!({"url": "https://pma.example/members", "content": "<p>Members Only. Please log in.</p>"}),
    )
    .await;
    assert_eq!(output["success"], false);
    assert_eq!(output["auth_required"], true);
    assert!(output["records"].as_array().unwrap().is_empty());
}

// --- dedupe / scorer / resolver ---

fn company(id: &str, name: &str, domain: Option<&str>) -> Value {
    let mut record = json!({
        "id": id,
        "company_name": name,
        "city": "Cleveland",
        "state": "OH",
        "provenance": [{
            "source_url": "https://pma.example/profile",
            "extracted_at": "2026-03-01T12:00:00Z",
            "extracted_by": "extraction.html_parser"
        }]
    });
    if let Some(domain) = domain {
        record["domain"] = json!(domain);
    }
    record
}

#[tokio::test]
async fn dedupe_merges_suffix_variants() {
    let h = harness();
    let output = run(
        &Dedupe,
        &h,
        json!({"records": [
            company("cmp-1", "Acme Manufacturing, Inc.", Some("acme.example")),
            company("cmp-2", "Acme Manufacturing LLC", Some("acme.example")),
            company("cmp-3", "Basso Industries", Some("basso.example")),
        ]}),
    )
    .await;

    let records = output["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(output["duplicates_removed"], 1);
    // Survivor keeps the first record's identity
    assert_eq!(records[0]["id"], "cmp-1");
}

#[tokio::test]
async fn dedupe_keeps_distinct_companies_apart() {
    let h = harness();
    let output = run(
        &Dedupe,
        &h,
        json!({"records": [
            company("cmp-1", "Acme Manufacturing", Some("acme.example")),
            company("cmp-2", "Acme Tooling", Some("acmetooling.example")),
        ]}),
    )
    .await;
    assert_eq!(output["records"].as_array().unwrap().len(), 2);
    assert_eq!(output["duplicates_removed"], 0);
}

#[tokio::test]
async fn scorer_attaches_score_and_grade() {
    let h = harness();
    let output = run(&Scorer, &h, json!({"records": [company("cmp-1", "Acme", Some("acme.example"))]}))
        .await;
    let record = &output["records"][0];
    let score = record["quality_score"].as_u64().unwrap();
    assert!(score <= 100);
    assert!(record["quality_grade"].is_string());
}

#[tokio::test]
async fn resolver_produces_canonical_entities_with_lineage() {
    let h = harness();
    let output = run(
        &EntityResolver,
        &h,
        json!({"records": [
            company("cmp-1", "Acme Manufacturing", Some("acme.example")),
            company("cmp-2", "Acme Manufacturing Inc", Some("acme.example")),
            company("cmp-3", "Basso Industries", Some("basso.example")),
        ]}),
    )
    .await;

    let entities = output["canonical_entities"].as_array().unwrap();
    assert_eq!(entities.len(), 2);
    let acme = entities
        .iter()
        .find(|e| e["merged_from"].as_array().unwrap().len() == 2)
        .expect("merged entity");
    assert!(acme["id"].as_str().unwrap().starts_with("canon-"));
    assert!(acme["completeness"].as_u64().unwrap() > 0);
}

// --- policy boundary ---

#[tokio::test]
async fn non_network_agents_cannot_reach_the_http_core() {
    let h = harness();
    let ctx = h.ctx.for_agent(&Dedupe);
    let err = ctx.http().unwrap_err();
    assert!(matches!(err, crate::AgentError::Policy { .. }));

    let ctx = h.ctx.for_agent(&LinkCrawler);
    assert!(ctx.http().is_ok());
}

// --- enrichment pass-through ---

#[tokio::test]
async fn firmographic_without_key_passes_through_and_stamps() {
    use crate::enrichment::Firmographic;
    let h = harness();
    let output =
        run(&Firmographic, &h, json!({"records": [company("cmp-1", "Acme", Some("acme.example"))]}))
            .await;

    assert_eq!(output["provider"], "none");
    let record = &output["records"][0];
    let entries = record["provenance"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["extracted_by"], "enrichment.firmographic");
    // No network call was made without the key
    assert!(h.transport.calls().is_empty());
}
