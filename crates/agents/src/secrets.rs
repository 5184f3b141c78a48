// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chained secret lookup with a TTL cache.
//!
//! Providers are consulted in order; the first non-empty value wins.
//! Results (including misses) are cached for `ttl` against the shared
//! clock, so rotation is implicit via expiry; there is no production
//! invalidation API. Tests that mutate the process environment use
//! [`SecretStore::reset`] together with `serial_test`.

use parking_lot::Mutex;
use scout_core::SharedClock;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Environment variable naming the JSON file backing [`FileProvider`].
pub const SECRETS_FILE_ENV: &str = "SCOUT_SECRETS_FILE";

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// One backend in the lookup chain.
pub trait SecretProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment. Always available.
pub struct EnvProvider;

impl SecretProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Reads secrets from a flat JSON object file (the external secret store
/// mount). Missing or malformed files yield an empty provider.
pub struct FileProvider {
    values: HashMap<String, String>,
}

impl FileProvider {
    pub fn load(path: &Path) -> Self {
        let values = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, String>>(&raw).ok())
            .unwrap_or_default();
        if values.is_empty() {
            tracing::warn!(path = %path.display(), "secrets file missing or empty");
        }
        Self { values }
    }
}

impl SecretProvider for FileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned().filter(|v| !v.is_empty())
    }
}

/// Provider chain with a per-key TTL cache. Thread-safe, process-scoped.
pub struct SecretStore {
    providers: Vec<Box<dyn SecretProvider>>,
    cache: Mutex<HashMap<String, (Option<String>, Instant)>>,
    ttl: Duration,
    clock: SharedClock,
}

impl SecretStore {
    pub fn new(providers: Vec<Box<dyn SecretProvider>>, ttl: Duration, clock: SharedClock) -> Self {
        Self { providers, cache: Mutex::new(HashMap::new()), ttl, clock }
    }

    /// Standard chain: file store (when `SCOUT_SECRETS_FILE` is set),
    /// then environment.
    pub fn from_env(clock: SharedClock) -> Self {
        let mut providers: Vec<Box<dyn SecretProvider>> = Vec::new();
        if let Ok(path) = std::env::var(SECRETS_FILE_ENV) {
            providers.push(Box::new(FileProvider::load(Path::new(&path))));
        }
        providers.push(Box::new(EnvProvider));
        Self::new(providers, DEFAULT_TTL, clock)
    }

    /// Look up a secret: cache first, then the provider chain.
    /// Misses are cached too, to avoid hammering slow providers.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        {
            let mut cache = self.cache.lock();
            if let Some((value, cached_at)) = cache.get(key) {
                if now.saturating_duration_since(*cached_at) < self.ttl {
                    return value.clone();
                }
                cache.remove(key);
            }
        }

        // Providers queried outside the lock; lookups may be slow.
        let mut value = None;
        for provider in &self.providers {
            if let Some(found) = provider.get(key) {
                tracing::debug!(key, provider = provider.name(), "secret resolved");
                value = Some(found);
                break;
            }
        }

        self.cache.lock().insert(key.to_string(), (value.clone(), now));
        value
    }

    /// Presence check that never logs the value.
    pub fn present(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Drop every cached entry. Tests only; production rotation relies
    /// on TTL expiry.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
