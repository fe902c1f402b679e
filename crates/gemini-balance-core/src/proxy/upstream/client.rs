use gemini_balance_types::GatewayConfig;
use reqwest::{header::HeaderMap, Client, Method, Response};
use std::sync::Arc;

use super::UpstreamError;
use crate::proxy::common::client_builder::build_http_client;
use crate::proxy::common::credential::mask_credential;
use crate::proxy::timeout::TimeoutGuard;
use crate::proxy::token_bucket::TokenBucket;
use crate::AppResult;

/// Everything one outbound call needs. Built per request, consumed by `send`.
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<reqwest::Body>,
    /// Credential chosen for this call, kept for logging.
    pub credential: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: HeaderMap::new(), body: None, credential: None }
    }
}

/// Shared client for every upstream-bound request.
///
/// Owns the admission limiter and the deadline so that all outbound traffic,
/// whichever handler produced it, goes through the same bucket.
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_version: String,
    limiter: Arc<TokenBucket>,
    guard: TimeoutGuard,
}

impl UpstreamClient {
    pub fn new(http: Client, config: &GatewayConfig) -> Self {
        Self {
            http,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            limiter: Arc::new(TokenBucket::new(
                config.rate_limit_capacity as f64,
                config.rate_limit_refill_rate as f64,
            )),
            guard: TimeoutGuard::from_millis(config.fetch_timeout_ms),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> AppResult<Self> {
        let http = build_http_client()?;
        Ok(Self::new(http, config))
    }

    pub fn limiter(&self) -> &Arc<TokenBucket> {
        &self.limiter
    }

    pub fn timeout(&self) -> TimeoutGuard {
        self.guard
    }

    /// `{base}/{version}{path}{?query}`; the path is forced to start with `/`
    /// and the query is carried over verbatim.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        match query.filter(|q| !q.is_empty()) {
            Some(qs) => {
                format!("{}/{}{}{}?{}", self.base_url, self.api_version, separator, path, qs)
            },
            None => format!("{}/{}{}{}", self.base_url, self.api_version, separator, path),
        }
    }

    /// Gemini's OpenAI-compatible surface, e.g. `{base}/v1beta/openai/chat/completions`.
    pub fn build_openai_url(&self, endpoint: &str) -> String {
        self.build_url(&format!("/openai{}", endpoint), None)
    }

    /// One admission-controlled, deadline-bounded attempt. No retries.
    ///
    /// The deadline covers the call up to the response head; the body is
    /// streamed afterwards without a bound.
    pub async fn send(&self, request: OutboundRequest) -> Result<Response, UpstreamError> {
        let OutboundRequest { method, url, headers, body, credential } = request;

        self.limiter.wait_for_tokens(1.0).await;

        tracing::debug!(
            %method,
            target_url = %url,
            credential = %credential.as_deref().map(mask_credential).unwrap_or_default(),
            "Sending request upstream"
        );

        let mut builder = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = self.guard.run(builder.send()).await?;
        tracing::debug!(status = response.status().as_u16(), target_url = %url, "Upstream responded");
        Ok(response)
    }
}
