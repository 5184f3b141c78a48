// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalization utilities for names, URLs, and content hashes.

use sha2::{Digest, Sha256};
use url::Url;

/// Legal-form suffixes stripped during company-name normalization.
const NAME_SUFFIXES: [&str; 15] = [
    "incorporated",
    "inc",
    "corporation",
    "corp",
    "llc",
    "l.l.c",
    "limited",
    "ltd",
    "company",
    "co",
    "plc",
    "gmbh",
    "ag",
    "sa",
    "nv",
];

/// Normalize a company name for matching: lowercase, strip trailing legal
/// suffixes, drop punctuation, collapse whitespace.
pub fn normalize_company_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .filter(|w| !w.is_empty())
        .collect();

    // Strip repeated trailing suffixes ("Acme Holdings Co Inc" -> "acme holdings")
    while let Some(last) = words.last() {
        let bare = last.trim_end_matches('.');
        if NAME_SUFFIXES.contains(&bare) && words.len() > 1 {
            words.pop();
        } else {
            break;
        }
    }

    words
        .iter()
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a URL for consistent comparison: force a scheme, lowercase
/// the host, drop a `www.` prefix and any trailing path slash.
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let Ok(parsed) = Url::parse(&with_scheme) else {
        return with_scheme;
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = parsed.path().trim_end_matches('/');
    format!("{}://{}{}", parsed.scheme(), host, path)
}

/// Extract the bare domain (no scheme, no `www.`) from a URL or host string.
pub fn extract_domain(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    match Url::parse(&with_scheme) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            host.strip_prefix("www.").unwrap_or(&host).to_string()
        }
        Err(_) => String::new(),
    }
}

/// Hex SHA-256 of page content, used for change detection and snapshots.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
