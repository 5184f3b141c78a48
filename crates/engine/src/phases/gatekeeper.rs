// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gatekeeper: one access verdict per unique queued domain; disallowed
//! domains have their queue entries moved to `blocked_urls`.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{AccessVerdict, Phase};
use serde_json::json;
use std::collections::BTreeSet;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let domains: BTreeSet<String> = cx
        .state
        .buckets
        .crawl_queue
        .iter()
        .map(|entry| scout_core::extract_domain(&entry.url))
        .filter(|domain| !domain.is_empty())
        .collect();

    for domain in domains {
        if cx.interrupted() {
            return Ok(());
        }
        let already_done = cx
            .state
            .phase_progress
            .cursor(Phase::Gatekeeper)
            .is_some_and(|cursor| cursor.is_done(&domain));
        if already_done {
            continue;
        }

        let result = cx
            .run_agent(
                "discovery.access_gatekeeper",
                json!({ "domain": domain, "check_page": true }),
            )
            .await?;

        let allowed = match result {
            Some(result) => {
                match serde_json::from_value::<AccessVerdict>(result.output["verdict"].clone()) {
                    Ok(verdict) => {
                        let allowed = verdict.allowed;
                        cx.state.buckets.verdicts.insert(verdict);
                        allowed
                    }
                    Err(error) => {
                        tracing::warn!(domain, error = %error, "malformed verdict, blocking domain");
                        false
                    }
                }
            }
            // Skippable failure (circuit open, repeated timeouts): treat
            // the domain as not-yet-verified and block its URLs for this
            // run rather than crawling unchecked.
            None => false,
        };

        if !allowed {
            let urls: Vec<String> = cx
                .state
                .buckets
                .crawl_queue
                .iter()
                .filter(|entry| scout_core::extract_domain(&entry.url) == domain)
                .map(|entry| entry.url.clone())
                .collect();
            let at = cx.clock.utc_now();
            for url in urls {
                let epoch = cx.epoch_ms();
                cx.state.mark_blocked(&url, "gatekeeper verdict", at, epoch)?;
            }
        }

        cx.state.phase_progress.cursor_mut(Phase::Gatekeeper).mark(&domain);
        cx.item_done()?;
    }

    Ok(())
}
