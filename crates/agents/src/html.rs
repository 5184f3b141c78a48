// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal HTML scanning shared by the built-in agents.
//!
//! Site-specific parsers with real selector configurations plug in as
//! their own agents; these helpers cover the generic shapes the built-in
//! extractors understand (href lists, heading blocks, "City, ST" lines).

/// Extract every `href` attribute value, in document order.
pub(crate) fn extract_hrefs(content: &str) -> Vec<String> {
    let mut hrefs = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find("href=") {
        rest = &rest[pos + 5..];
        let Some(quote) = rest.chars().next() else {
            break;
        };
        if quote != '"' && quote != '\'' {
            continue;
        }
        rest = &rest[1..];
        if let Some(end) = rest.find(quote) {
            let href = rest[..end].trim();
            if !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:") {
                hrefs.push(href.to_string());
            }
            rest = &rest[end..];
        }
    }
    hrefs
}

/// Extract the text of `<h2>`/`<h3>` headings with the byte offset where
/// each heading starts, in document order.
pub(crate) fn extract_headings(content: &str) -> Vec<(usize, String)> {
    let mut headings = Vec::new();
    for tag in ["h2", "h3"] {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        let mut offset = 0;
        while let Some(pos) = content[offset..].find(&open) {
            let start = offset + pos;
            let Some(text_start) = content[start..].find('>').map(|i| start + i + 1) else {
                break;
            };
            let Some(text_end) = content[text_start..].find(&close).map(|i| text_start + i) else {
                break;
            };
            let text = strip_tags(&content[text_start..text_end]);
            if !text.is_empty() {
                headings.push((start, text));
            }
            offset = text_end + close.len();
        }
    }
    headings.sort_by_key(|(pos, _)| *pos);
    headings
}

/// Drop nested tags and collapse whitespace.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find a `City, ST` pattern in a fragment: a comma followed by a
/// two-letter uppercase state code. Tag boundaries act as line breaks so
/// neighboring elements do not bleed into the city text.
pub(crate) fn find_city_state(fragment: &str) -> Option<(String, String)> {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push('\n');
            }
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    for line in text.split(['\n', '|', ';']) {
        let Some((city_part, state_part)) = line.rsplit_once(',') else {
            continue;
        };
        let state: String =
            state_part.trim().chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let city = city_part.trim();
        if state.len() == 2
            && state.chars().all(|c| c.is_ascii_uppercase())
            && !city.is_empty()
            && !city.contains(',')
            && city.len() < 60
        {
            return Some((city.to_string(), state));
        }
    }
    None
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
