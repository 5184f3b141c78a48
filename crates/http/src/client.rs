// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composed HTTP core: limiter -> breaker -> transport -> retry.

use crate::{
    BreakerConfig, CircuitBreaker, HttpError, RateLimitConfig, RateLimiter, Response, RetryPolicy,
    Transport,
};
use scout_core::{system_clock, Metrics, SharedClock};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default per-request transport timeout.
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited, circuit-broken HTTP client shared by all agents.
pub struct HttpCore {
    limiter: RateLimiter,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
    metrics: Metrics,
    clock: SharedClock,
}

impl std::fmt::Debug for HttpCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCore").finish_non_exhaustive()
    }
}

impl HttpCore {
    pub fn builder() -> HttpCoreBuilder {
        HttpCoreBuilder::default()
    }

    /// GET a URL through the full wrapper stack.
    pub async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.request("GET", url).await
    }

    /// POST to a URL through the full wrapper stack.
    pub async fn post(&self, url: &str) -> Result<Response, HttpError> {
        self.request("POST", url).await
    }

    async fn request(&self, method: &str, raw_url: &str) -> Result<Response, HttpError> {
        let url = Url::parse(raw_url).map_err(|_| HttpError::InvalidUrl(raw_url.to_string()))?;
        let host = url.host_str().ok_or_else(|| HttpError::InvalidUrl(raw_url.to_string()))?.to_string();

        let mut last_error: Option<HttpError> = None;

        for attempt in 0..self.retry.max_attempts() {
            // Breaker first: an open circuit must produce zero network calls
            // and zero token consumption, even mid-retry-sequence.
            self.breaker.check(&host)?;
            self.limiter.acquire(&host).await;

            let start = self.clock.now();
            let result = self.transport.execute(method, &url).await;
            let elapsed = self.clock.now().saturating_duration_since(start);
            self.metrics.observe(
                "http_request_duration_seconds",
                &[("host", &host), ("method", method)],
                elapsed,
            );

            let error = match result {
                Ok(response) => {
                    self.metrics.inc(
                        "http_requests_total",
                        &[("host", &host), ("method", method), ("status", &response.status.to_string())],
                    );

                    if response.is_success() {
                        self.breaker.record_success(&host);
                        return Ok(response);
                    }

                    let error = HttpError::Status { host: host.clone(), status: response.status };
                    match response.status {
                        // Back-pressure: retry, never a breaker failure.
                        429 => {
                            if attempt + 1 < self.retry.max_attempts() {
                                let delay = response
                                    .retry_after_secs
                                    .map(Duration::from_secs)
                                    .map(|d| d.min(self.retry.max_backoff))
                                    .unwrap_or_else(|| self.retry.jittered_delay(attempt));
                                tracing::debug!(host, attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                                tokio::time::sleep(delay).await;
                                last_error = Some(error);
                                continue;
                            }
                            error
                        }
                        status if (500..600).contains(&status) => {
                            self.metrics.inc(
                                "http_errors_total",
                                &[("host", &host), ("kind", error.metric_kind())],
                            );
                            self.breaker.record_failure(&host);
                            if attempt + 1 < self.retry.max_attempts() {
                                let delay = self.retry.jittered_delay(attempt);
                                tracing::debug!(host, status, attempt, "server error, retrying");
                                tokio::time::sleep(delay).await;
                                last_error = Some(error);
                                continue;
                            }
                            error
                        }
                        // 404, 403, and friends: host is healthy, the
                        // resource is not. No retry.
                        _ => {
                            self.breaker.record_success(&host);
                            error
                        }
                    }
                }
                Err(error) => {
                    self.metrics.inc(
                        "http_errors_total",
                        &[("host", &host), ("kind", error.metric_kind())],
                    );
                    if error.is_breaker_failure() {
                        self.breaker.record_failure(&host);
                    }
                    if error.is_retryable() && attempt + 1 < self.retry.max_attempts() {
                        let delay = self.retry.jittered_delay(attempt);
                        tracing::debug!(host, error = %error, attempt, "transport error, retrying");
                        tokio::time::sleep(delay).await;
                        last_error = Some(error);
                        continue;
                    }
                    error
                }
            };

            return Err(error);
        }

        // Loop exits only via returns; this is the exhaustion edge when the
        // final attempt also slept (unreachable in practice).
        Err(last_error.unwrap_or(HttpError::Transport {
            host,
            message: "retries exhausted".to_string(),
        }))
    }

    /// Breaker handle for observers and tests.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Limiter handle, used by the gatekeeper for verdict reporting.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Builder wiring the pieces together with sane defaults.
pub struct HttpCoreBuilder {
    rate_config: RateLimitConfig,
    breaker_config: BreakerConfig,
    retry: RetryPolicy,
    transport: Option<Arc<dyn Transport>>,
    metrics: Option<Metrics>,
    clock: Option<SharedClock>,
}

impl Default for HttpCoreBuilder {
    fn default() -> Self {
        Self {
            rate_config: RateLimitConfig::default(),
            breaker_config: BreakerConfig::default(),
            retry: RetryPolicy::default(),
            transport: None,
            metrics: None,
            clock: None,
        }
    }
}

impl HttpCoreBuilder {
    pub fn rate_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_config = config;
        self
    }

    pub fn breaker_config(mut self, config: BreakerConfig) -> Self {
        self.breaker_config = config;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<HttpCore, HttpError> {
        let clock = self.clock.unwrap_or_else(system_clock);
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(crate::ReqwestTransport::new(TRANSPORT_TIMEOUT)?),
        };
        Ok(HttpCore {
            limiter: RateLimiter::new(self.rate_config),
            breaker: CircuitBreaker::new(self.breaker_config, clock.clone()),
            retry: self.retry,
            transport,
            metrics: self.metrics.unwrap_or_else(|| Metrics::global().clone()),
            clock,
        })
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
