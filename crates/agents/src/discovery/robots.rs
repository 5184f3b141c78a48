// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! robots.txt evaluation.
//!
//! Covers the subset real association sites use: user-agent groups,
//! Allow/Disallow prefix rules with longest-match precedence, and
//! Crawl-delay. Group selection prefers a group naming our token over
//! the `*` group.

#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
    crawl_delay: Option<f64>,
}

#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    prefix: String,
}

/// Parsed robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    groups: Vec<Group>,
}

impl RobotsPolicy {
    /// Parse robots.txt content. Unknown directives are ignored.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current = Group::default();
        let mut in_rules = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_ascii_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group.
                    if in_rules {
                        groups.push(std::mem::take(&mut current));
                        in_rules = false;
                    }
                    current.agents.push(value.to_ascii_lowercase());
                }
                "disallow" => {
                    in_rules = true;
                    if !value.is_empty() {
                        current.rules.push(Rule { allow: false, prefix: value.to_string() });
                    }
                }
                "allow" => {
                    in_rules = true;
                    if !value.is_empty() {
                        current.rules.push(Rule { allow: true, prefix: value.to_string() });
                    }
                }
                "crawl-delay" => {
                    in_rules = true;
                    current.crawl_delay = value.parse().ok();
                }
                _ => {}
            }
        }
        if !current.agents.is_empty() {
            groups.push(current);
        }

        Self { groups }
    }

    fn group_for(&self, token: &str) -> Option<&Group> {
        let token = token.to_ascii_lowercase();
        self.groups
            .iter()
            .find(|g| g.agents.iter().any(|a| a != "*" && token.contains(a.as_str())))
            .or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|a| a == "*")))
    }

    /// Whether `path` may be fetched by `token`. Longest matching prefix
    /// wins; no matching rule means allowed.
    pub fn is_allowed(&self, token: &str, path: &str) -> bool {
        let Some(group) = self.group_for(token) else {
            return true;
        };
        group
            .rules
            .iter()
            .filter(|rule| path.starts_with(&rule.prefix))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.allow)
            .unwrap_or(true)
    }

    /// Crawl-delay for `token`, if the matching group declares one.
    pub fn crawl_delay(&self, token: &str) -> Option<f64> {
        self.group_for(token).and_then(|g| g.crawl_delay)
    }

    /// True when the policy forbids the site root entirely.
    pub fn blocks_everything(&self, token: &str) -> bool {
        !self.is_allowed(token, "/")
    }
}

#[cfg(test)]
#[path = "robots_tests.rs"]
mod tests;
