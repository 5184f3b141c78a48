// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport seam between the HTTP core and the wire.
//!
//! The default transport is `reqwest`; tests use [`ScriptedTransport`] so
//! breaker, limiter, and retry behavior can be exercised without sockets.

use crate::HttpError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// A plain response, already fully read.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header in seconds, when the server sent one.
    pub retry_after_secs: Option<u64>,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into(), retry_after_secs: None }
    }

    pub fn with_status(status: u16) -> Self {
        Self { status, body: String::new(), retry_after_secs: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One wire round-trip. Implementations do no retries and no rate limiting;
/// the core owns all of that.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, method: &str, url: &Url) -> Result<Response, HttpError>;
}

/// Production transport over a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

/// Browser-like UA with a secondary bot token; bare bot UAs trip WAFs on
/// association sites.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 ScoutBot/1.0";

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| HttpError::Transport { host: String::new(), message: e.to_string() })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, method: &str, url: &Url) -> Result<Response, HttpError> {
        let host = url.host_str().unwrap_or_default().to_string();
        let request = match method {
            "POST" => self.client.post(url.clone()),
            _ => self.client.get(url.clone()),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout { host: host.clone() }
            } else if e.is_connect() {
                HttpError::Connect { host: host.clone(), message: e.to_string() }
            } else {
                HttpError::Transport { host: host.clone(), message: e.to_string() }
            }
        })?;

        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Transport { host: host.clone(), message: e.to_string() })?;

        Ok(Response { status, body, retry_after_secs })
    }
}

/// Scripted transport for tests: pops pre-loaded results per host in order
/// and records every call it sees.
#[cfg(any(test, feature = "test-support"))]
pub struct ScriptedTransport {
    scripts: parking_lot::Mutex<std::collections::HashMap<String, std::collections::VecDeque<Result<Response, HttpError>>>>,
    calls: parking_lot::Mutex<Vec<String>>,
    /// Returned once a host's script runs dry.
    default: Response,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            scripts: parking_lot::Mutex::new(std::collections::HashMap::new()),
            calls: parking_lot::Mutex::new(Vec::new()),
            default: Response::ok("<html></html>"),
        }
    }

    pub fn with_default(mut self, response: Response) -> Self {
        self.default = response;
        self
    }

    /// Queue a scripted result for the next call to `host`.
    pub fn push(&self, host: &str, result: Result<Response, HttpError>) {
        self.scripts.lock().entry(host.to_string()).or_default().push_back(result);
    }

    /// Queue `n` copies of the same status for `host`.
    pub fn push_status(&self, host: &str, status: u16, n: usize) {
        for _ in 0..n {
            self.push(host, Ok(Response::with_status(status)));
        }
    }

    /// URLs of every wire call made, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of wire calls made to one host.
    pub fn call_count(&self, host: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|u| Url::parse(u).ok().and_then(|u| u.host_str().map(|h| h == host)).unwrap_or(false))
            .count()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, _method: &str, url: &Url) -> Result<Response, HttpError> {
        self.calls.lock().push(url.to_string());
        let host = url.host_str().unwrap_or_default().to_string();
        let next = self.scripts.lock().get_mut(&host).and_then(|q| q.pop_front());
        next.unwrap_or_else(|| Ok(self.default.clone()))
    }
}
