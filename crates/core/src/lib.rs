// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scout-core: shared vocabulary for the scout acquisition pipeline

pub mod macros;

pub mod clock;
pub mod error;
pub mod id;
pub mod metrics;
pub mod normalize;
pub mod phase;
pub mod record;
pub mod task;

pub use clock::{system_clock, Clock, FakeClock, SharedClock, SystemClock};
pub use error::ErrorKind;
pub use id::short;
pub use metrics::{Metrics, MetricsSnapshot};
pub use normalize::{content_hash, extract_domain, normalize_company_name, normalize_url};
pub use phase::{Phase, PhaseOutcome, PhaseRecord};
pub use record::{
    AccessVerdict, BlockedUrl, CanonicalEntity, Company, Contact, ErrorRecord, EventRecord,
    ExportArtifact, GraphEdge, PageSnapshot, PageType, Participant, Provenance, QualityGrade,
    QueueEntry, Record, Signal, VisitedUrl,
};
pub use task::{AgentResult, AgentTask, Capability, Delta, InvocationId, JobId};
