// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-global counters and histograms.
//!
//! The registry is deliberately small: labeled counters and fixed-bucket
//! duration histograms behind one mutex. Callers hold the lock only long
//! enough to bump a number; there is no exporter wire format, only a
//! snapshot for tests and a text dump for the CLI.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Histogram bucket upper bounds, in seconds.
const DURATION_BUCKETS: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

type LabelSet = BTreeMap<String, String>;

#[derive(Debug, Default, Clone)]
struct Histogram {
    /// Counts per bucket, one extra slot for +Inf.
    counts: [u64; DURATION_BUCKETS.len() + 1],
    sum_secs: f64,
    total: u64,
}

impl Histogram {
    fn observe(&mut self, secs: f64) {
        let idx = DURATION_BUCKETS
            .iter()
            .position(|bound| secs <= *bound)
            .unwrap_or(DURATION_BUCKETS.len());
        self.counts[idx] += 1;
        self.sum_secs += secs;
        self.total += 1;
    }
}

#[derive(Default)]
struct Registry {
    counters: BTreeMap<(String, LabelSet), u64>,
    histograms: BTreeMap<(String, LabelSet), Histogram>,
}

/// Shared metrics handle. Cloning is cheap; all clones share storage.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<Mutex<Registry>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-global registry.
    pub fn global() -> &'static Metrics {
        static GLOBAL: OnceLock<Metrics> = OnceLock::new();
        GLOBAL.get_or_init(Metrics::new)
    }

    /// Increment a labeled counter by one.
    pub fn inc(&self, name: &str, labels: &[(&str, &str)]) {
        self.add(name, labels, 1);
    }

    /// Increment a labeled counter by `n`.
    pub fn add(&self, name: &str, labels: &[(&str, &str)], n: u64) {
        let key = (name.to_string(), to_label_set(labels));
        *self.inner.lock().counters.entry(key).or_insert(0) += n;
    }

    /// Record a duration observation in a labeled histogram.
    pub fn observe(&self, name: &str, labels: &[(&str, &str)], duration: Duration) {
        let key = (name.to_string(), to_label_set(labels));
        self.inner.lock().histograms.entry(key).or_default().observe(duration.as_secs_f64());
    }

    /// Current counter value, 0 if never incremented.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = (name.to_string(), to_label_set(labels));
        self.inner.lock().counters.get(&key).copied().unwrap_or(0)
    }

    /// Sum of a counter across all label sets.
    pub fn counter_total(&self, name: &str) -> u64 {
        self.inner
            .lock()
            .counters
            .iter()
            .filter(|((n, _), _)| n == name)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Point-in-time copy of all series.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        MetricsSnapshot {
            counters: inner
                .counters
                .iter()
                .map(|((name, labels), value)| (name.clone(), labels.clone(), *value))
                .collect(),
            histograms: inner
                .histograms
                .iter()
                .map(|((name, labels), h)| HistogramSnapshot {
                    name: name.clone(),
                    labels: labels.clone(),
                    count: h.total,
                    sum_secs: h.sum_secs,
                })
                .collect(),
        }
    }

    /// Render all series as `name{k="v",...} value` lines.
    pub fn render_text(&self) -> String {
        let snap = self.snapshot();
        let mut out = String::new();
        for (name, labels, value) in &snap.counters {
            out.push_str(&format!("{}{} {}\n", name, render_labels(labels), value));
        }
        for h in &snap.histograms {
            out.push_str(&format!(
                "{}_count{} {}\n{}_sum{} {:.6}\n",
                h.name,
                render_labels(&h.labels),
                h.count,
                h.name,
                render_labels(&h.labels),
                h.sum_secs,
            ));
        }
        out
    }
}

/// Exported copy of the registry contents.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub counters: Vec<(String, LabelSet, u64)>,
    pub histograms: Vec<HistogramSnapshot>,
}

#[derive(Debug, Clone)]
pub struct HistogramSnapshot {
    pub name: String,
    pub labels: LabelSet,
    pub count: u64,
    pub sum_secs: f64,
}

fn to_label_set(labels: &[(&str, &str)]) -> LabelSet {
    labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn render_labels(labels: &LabelSet) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let inner: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v:?}")).collect();
    format!("{{{}}}", inner.join(","))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
