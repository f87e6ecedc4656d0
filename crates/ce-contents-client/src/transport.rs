// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request execution with a deadline and a bounded rate-limit retry
//!
//! [`HttpTransport`] is the seam between request shaping and the network.
//! [`RetryingTransport`] wraps any transport with the retry policy: a 429 or
//! 403 response is retried after `Retry-After` seconds (or a fixed fallback
//! delay) while retries remain; every other response is handed back as-is.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{ContentsError, HttpError, Result};

/// A fully shaped request, ready to be executed (and re-executed)
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, mostly useful in assertions
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// A buffered response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_text(&self) -> String {
        self.status.canonical_reason().unwrap_or_default().to_string()
    }

    /// `Retry-After` in seconds, when present, positive and representable
    pub fn retry_after(&self) -> Option<Duration> {
        let raw = self.headers.get(RETRY_AFTER)?.to_str().ok()?;
        let seconds: f64 = raw.trim().parse().ok()?;
        if seconds.is_nan() || seconds <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(seconds).ok()
    }

    pub fn into_http_error(self) -> HttpError {
        HttpError {
            status: self.status.as_u16(),
            status_text: self.status_text(),
            body: self.body,
        }
    }

    /// Fail with [`HttpError`] unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ContentsError::Http(self.into_http_error()))
        }
    }

    /// Decode the body, reporting shape mismatches as malformed
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ContentsError::Malformed(format!("unexpected response body: {}", e)))
    }
}

/// Executes one request against the network, no retries
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Deadline and rate-limit retry budget for one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub retries: u32,
    /// Delay used when `Retry-After` is absent or not positive
    pub fallback_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            retries: 1,
            fallback_delay: Duration::from_millis(1_000),
        }
    }
}

/// 429, or a 403 that may be secondary rate limiting
pub fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN
}

/// Wraps a transport with a per-attempt deadline and the rate-limit retry
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send_with(request, self.policy).await
    }

    pub async fn send_with(&self, request: HttpRequest, policy: RetryPolicy) -> Result<HttpResponse> {
        let mut retries = policy.retries;

        loop {
            let attempt = tokio::time::timeout(policy.timeout, self.inner.execute(request.clone()));
            let response = match attempt.await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        timeout_ms = policy.timeout.as_millis() as u64,
                        "Request timed out"
                    );
                    return Err(ContentsError::Timeout(policy.timeout));
                }
            };

            if retries == 0 || !is_rate_limited(response.status) {
                return Ok(response);
            }

            let delay = response.retry_after().unwrap_or(policy.fallback_delay);
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                status = response.status.as_u16(),
                delay_ms = delay.as_millis() as u64,
                retries_left = retries - 1,
                "Rate limited, retrying"
            );
            tokio::time::sleep(delay).await;
            retries -= 1;
        }
    }
}
