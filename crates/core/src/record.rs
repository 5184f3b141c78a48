// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record ontology: the typed entities flowing through pipeline buckets.
//!
//! Every extracted entity carries a `provenance` list; records without
//! provenance are rejected at the policy boundary before they ever reach
//! a bucket. All record types expose a stable surrogate identifier via
//! [`Record`], which buckets use for upsert-by-id semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record that can live in a pipeline bucket.
pub trait Record: Clone + serde::Serialize + serde::de::DeserializeOwned {
    /// Stable surrogate identifier. Bucket uniqueness is keyed on this.
    fn record_id(&self) -> &str;

    /// Attribution entries. Empty is a policy violation for extracted
    /// entities; infrastructure records (queue entries, visited URLs)
    /// return an empty slice.
    fn provenance(&self) -> &[Provenance] {
        &[]
    }
}

/// Attribution entry attached to every extracted datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_url: String,
    pub extracted_at: DateTime<Utc>,
    pub extracted_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl Provenance {
    pub fn new(source_url: impl Into<String>, extracted_by: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            source_url: source_url.into(),
            extracted_at: at,
            extracted_by: extracted_by.into(),
            association: None,
            job_id: None,
        }
    }
}

/// Classified page type, driving extractor routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    MemberDirectory,
    MemberDetail,
    EventsList,
    EventDetail,
    ParticipantsList,
    About,
    Other,
}

crate::simple_display! {
    PageType {
        MemberDirectory => "MEMBER_DIRECTORY",
        MemberDetail => "MEMBER_DETAIL",
        EventsList => "EVENTS_LIST",
        EventDetail => "EVENT_DETAIL",
        ParticipantsList => "PARTICIPANTS_LIST",
        About => "ABOUT",
        Other => "OTHER",
    }
}

/// Quality grade derived from the 0-100 quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    F,
}

impl QualityGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => QualityGrade::A,
            80..=89 => QualityGrade::B,
            70..=79 => QualityGrade::C,
            60..=69 => QualityGrade::D,
            _ => QualityGrade::F,
        }
    }
}

/// Entry in the crawl queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub url: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type_hint: Option<PageType>,
}

impl QueueEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            priority: 0,
            depth: 0,
            source_url: None,
            association: None,
            page_type_hint: None,
        }
    }
}

impl Record for QueueEntry {
    fn record_id(&self) -> &str {
        &self.url
    }
}

/// A URL that has been fetched (or conclusively attempted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedUrl {
    pub url: String,
    pub visited_at: DateTime<Utc>,
}

impl Record for VisitedUrl {
    fn record_id(&self) -> &str {
        &self.url
    }
}

/// A URL blocked by robots.txt, auth walls, or policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedUrl {
    pub url: String,
    pub reason: String,
    pub blocked_at: DateTime<Utc>,
}

impl Record for BlockedUrl {
    fn record_id(&self) -> &str {
        &self.url
    }
}

/// Snapshot of a fetched page. Content itself lives on disk at
/// `content_location`; the state file carries only the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_hash: String,
    pub content_location: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<PageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_extractor: Option<String>,
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
}

impl Record for PageSnapshot {
    fn record_id(&self) -> &str {
        &self.url
    }
}

/// Per-domain access verdict produced by the gatekeeper, once per job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessVerdict {
    pub domain: String,
    pub allowed: bool,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_delay_secs: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl Record for AccessVerdict {
    fn record_id(&self) -> &str {
        &self.domain
    }
}

/// A person attached to a company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// Extracted company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_founded: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erp_system: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_grade: Option<QualityGrade>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            company_name: name.into(),
            normalized_name: None,
            domain: None,
            website: None,
            city: None,
            state: None,
            employee_count_min: None,
            employee_count_max: None,
            year_founded: None,
            industry: None,
            erp_system: None,
            tech_stack: Vec::new(),
            associations: Vec::new(),
            contacts: Vec::new(),
            quality_score: None,
            quality_grade: None,
            provenance: Vec::new(),
        }
    }
}

impl Record for Company {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
}

/// Extracted event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_association: Option<String>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl Record for EventRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
}

/// Company participation in an event (exhibitor, sponsor, speaker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub event_id: String,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub participant_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_tier: Option<String>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl Record for Participant {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
}

/// Competitor mention detected on a company page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub competitor_name: String,
    pub signal_type: String,
    pub context: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_company_id: Option<String>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl Record for Signal {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
}

/// Deduplicated, merged company entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub id: String,
    pub company: Company,
    /// IDs of the source records merged into this entity.
    #[serde(default)]
    pub merged_from: Vec<String>,
    #[serde(default)]
    pub completeness: u8,
}

impl Record for CanonicalEntity {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provenance(&self) -> &[Provenance] {
        self.company.provenance()
    }
}

/// Edge in the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: impl Into<String>) -> Self {
        let (from, to, kind) = (from.into(), to.into(), kind.into());
        let id = format!("{from}--{kind}--{to}");
        Self { id, from, to, kind, attrs: BTreeMap::new() }
    }
}

impl Record for GraphEdge {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A generated export artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub kind: String,
    pub path: String,
    pub record_count: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl Record for ExportArtifact {
    fn record_id(&self) -> &str {
        &self.kind
    }

    fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
}

/// An error observed during execution, kept for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: String,
    pub phase: crate::Phase,
    pub agent: String,
    pub error_kind: crate::ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Record for ErrorRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
