// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record similarity used by dedupe and entity resolution.
//!
//! Name matching is edit-distance based (normalized Levenshtein).
//! Character-set measures score anagrams as identical and must not be
//! used here.

use serde_json::Value;

/// Field weights for pairwise record similarity.
const WEIGHTS: [(&str, f64); 4] =
    [("company_name", 0.5), ("domain", 0.3), ("city", 0.1), ("state", 0.1)];

/// Similarity of two company names after normalization, in `[0, 1]`.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = scout_core::normalize_company_name(a);
    let b = scout_core::normalize_company_name(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    strsim::normalized_levenshtein(&a, &b)
}

/// Weighted similarity of two records over the match fields.
///
/// Fields missing on either side drop out of the weight total, so two
/// name-only records are compared purely by name.
pub fn match_score(a: &Value, b: &Value) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for (field, weight) in WEIGHTS {
        let Some(left) = a.get(field).and_then(Value::as_str).filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(right) = b.get(field).and_then(Value::as_str).filter(|s| !s.is_empty()) else {
            continue;
        };
        total_weight += weight;

        let similarity = match field {
            "company_name" => name_similarity(left, right),
            "domain" => {
                let (ld, rd) = (scout_core::extract_domain(left), scout_core::extract_domain(right));
                if !ld.is_empty() && ld == rd {
                    1.0
                } else {
                    0.0
                }
            }
            _ => {
                if left.eq_ignore_ascii_case(right) {
                    1.0
                } else {
                    0.0
                }
            }
        };
        total_score += similarity * weight;
    }

    if total_weight > 0.0 {
        total_score / total_weight
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "similarity_tests.rs"]
mod tests;
