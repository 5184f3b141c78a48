// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scout-contracts: the wire format between agents.
//!
//! Schemas are JSON documents keyed by `$id`. The registry is built in
//! two phases: scan everything first, then resolve cross-references by
//! identifier, never by file path, so mutually-referencing schemas load
//! in any order. An unresolved reference fails startup.

mod registry;
mod validate;

pub use registry::{SchemaError, SchemaRegistry};
pub use validate::{Mode, PathError, ValidationFailure, Validator};
