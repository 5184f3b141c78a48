// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn name_normalization_strips_legal_suffixes() {
    assert_eq!(normalize_company_name("Acme Manufacturing, Inc."), "acme manufacturing");
    assert_eq!(normalize_company_name("Basso Industries LLC"), "basso industries");
    assert_eq!(normalize_company_name("Delta Forge Co."), "delta forge");
    assert_eq!(normalize_company_name("Müller GmbH"), "müller");
}

#[test]
fn name_normalization_strips_stacked_suffixes() {
    assert_eq!(normalize_company_name("Acme Holdings Co Inc"), "acme holdings");
}

#[test]
fn name_normalization_keeps_single_suffix_word_names() {
    // A name that IS a suffix word should not normalize to empty
    assert_eq!(normalize_company_name("Corp"), "corp");
}

#[test]
fn url_normalization_is_idempotent() {
    let once = normalize_url("WWW.Example.COM/Members/");
    assert_eq!(once, "https://example.com/Members");
    assert_eq!(normalize_url(&once), once);
}

#[test]
fn url_normalization_preserves_scheme() {
    assert_eq!(normalize_url("http://example.com/a/"), "http://example.com/a");
}

#[test]
fn extract_domain_handles_bare_hosts_and_urls() {
    assert_eq!(extract_domain("https://www.pma.example/members?page=2"), "pma.example");
    assert_eq!(extract_domain("pma.example"), "pma.example");
    assert_eq!(extract_domain(""), "");
}

#[test]
fn content_hash_is_stable_and_sensitive() {
    let a = content_hash("<html>same</html>");
    let b = content_hash("<html>same</html>");
    let c = content_hash("<html>changed</html>");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
}
