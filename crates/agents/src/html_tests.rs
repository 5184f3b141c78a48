// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hrefs_are_extracted_in_order() {
    let html = r##"<a href="/members">Members</a> <a href='/events'>Events</a> <a href="#top">Top</a>"##;
    assert_eq!(extract_hrefs(html), vec!["/members".to_string(), "/events".to_string()]);
}

#[test]
fn javascript_links_are_skipped() {
    let html = r#"<a href="javascript:void(0)">x</a><a href="/real">y</a>"#;
    assert_eq!(extract_hrefs(html), vec!["/real".to_string()]);
}

#[test]
fn headings_come_back_in_document_order() {
    let html = "<h3>Second Block</h3>";
    let html = format!("<h2>First Block</h2><p>text</p>{html}");
    let headings = extract_headings(&html);
    let texts: Vec<&str> = headings.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["First Block", "Second Block"]);
    assert!(headings[0].0 < headings[1].0);
}

#[test]
fn headings_with_attributes_and_nested_tags_are_cleaned() {
    let html = r#"<h2 class="member"><a href="/p">Acme <b>Corp</b></a></h2>"#;
    let headings = extract_headings(html);
    assert_eq!(headings[0].1, "Acme Corp");
}

#[test]
fn strip_tags_collapses_whitespace() {
    assert_eq!(strip_tags("<p>Cleveland,\n   OH</p>"), "Cleveland, OH");
}

#[test]
fn city_state_pattern_is_found() {
    assert_eq!(
        find_city_state("<p>Cleveland, OH 44101</p>"),
        Some(("Cleveland".to_string(), "OH".to_string()))
    );
    assert_eq!(find_city_state("<p>no location here</p>"), None);
}

#[test]
fn lowercase_state_is_rejected() {
    assert_eq!(find_city_state("something, oh"), None);
}
