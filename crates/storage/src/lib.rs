// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scout-storage: the durable working set of a pipeline job.
//!
//! [`PipelineState`] holds the typed buckets and phase-progress cursors;
//! [`StateStore`] persists it with atomic write-to-temp-then-rename
//! checkpoints. The rename is the commit point: a crash between two
//! checkpoints loses at most the work since the last rename, and resume
//! replays nothing that a cursor already records as done.

mod bucket;
mod cursor;
mod state;
mod store;

pub use bucket::Bucket;
pub use cursor::{Cursor, PhaseProgress};
pub use state::{Buckets, Counters, PipelineState, StateError};
pub use store::{JobSummary, StateStore, StorageError};
