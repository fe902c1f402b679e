//! OpenAI-compatible surface, bridged onto Gemini's `/openai` endpoints.
//!
//! Requests keep their OpenAI shape; only the credential is rewritten and the
//! body is checked before it costs an upstream call.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::common::relay_response;
use crate::proxy::common::credential::{select_credential, CredentialPolicy};
use crate::proxy::common::error_classifier::{error_response, FailureContext};
use crate::proxy::common::ttl_cache::TtlCache;
use crate::proxy::common::validation::{validate_payload, PayloadSchema};
use crate::proxy::upstream::{OutboundRequest, UpstreamClient, UpstreamError};

/// Inbound bodies larger than this are rejected before validation.
pub const MAX_OPENAI_BODY_BYTES: usize = 100 * 1024 * 1024;

const MODELS_CACHE_KEY: &str = "openai:models";

/// OpenAI endpoints recognized by path suffix, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiEndpoint {
    ChatCompletions,
    Completions,
    Embeddings,
    Models,
}

impl OpenAiEndpoint {
    pub const ALL: [Self; 4] = [Self::ChatCompletions, Self::Completions, Self::Embeddings, Self::Models];

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::ChatCompletions => "/chat/completions",
            Self::Completions => "/completions",
            Self::Embeddings => "/embeddings",
            Self::Models => "/models",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|endpoint| path.ends_with(endpoint.suffix()))
    }

    const fn schema(self) -> Option<PayloadSchema> {
        match self {
            Self::ChatCompletions => Some(PayloadSchema::ChatCompletions),
            Self::Embeddings => Some(PayloadSchema::Embeddings),
            Self::Completions | Self::Models => None,
        }
    }
}

/// Handles OpenAI-shaped requests.
#[async_trait]
pub trait OpenAiCompat: Send + Sync {
    async fn handle(&self, endpoint: OpenAiEndpoint, request: Request) -> Response;
}

#[derive(Clone)]
struct CachedListing {
    content_type: Option<HeaderValue>,
    body: Bytes,
}

/// Default bridge: forwards to `{base}/{version}/openai{endpoint}` through the
/// shared upstream client.
pub struct GeminiOpenAiBridge {
    upstream: Arc<UpstreamClient>,
    credentials: Arc<dyn CredentialPolicy>,
    models_cache: TtlCache<CachedListing>,
    models_ttl: Duration,
}

impl GeminiOpenAiBridge {
    pub fn new(
        upstream: Arc<UpstreamClient>,
        credentials: Arc<dyn CredentialPolicy>,
        models_ttl: Duration,
    ) -> Self {
        Self { upstream, credentials, models_cache: TtlCache::new(), models_ttl }
    }

    /// `Authorization: Bearer k1,k2` -> `Bearer <one key>`.
    fn outbound_headers(&self, inbound: &HeaderMap) -> (HeaderMap, Option<String>) {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = inbound.get(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }

        let credential = inbound
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| raw.strip_prefix("Bearer ").or_else(|| raw.strip_prefix("bearer ")))
            .and_then(|keys| select_credential(keys, self.credentials.as_ref()));

        if let Some(key) = credential.as_deref() {
            match HeaderValue::from_str(&format!("Bearer {}", key)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                },
                Err(e) => tracing::warn!(error = %e, "Selected API key is not a valid header value"),
            }
        }

        (headers, credential)
    }

    async fn list_models(&self, inbound: &HeaderMap) -> Response {
        let (headers, credential) = self.outbound_headers(inbound);

        // Only callers presenting a key are served from cache.
        if credential.is_some() {
            if let Some(cached) = self.models_cache.get(MODELS_CACHE_KEY) {
                tracing::debug!("Serving model list from cache");
                return listing_response(cached);
            }
        }

        let target_url = self.upstream.build_openai_url(OpenAiEndpoint::Models.suffix());
        let ctx = FailureContext { context: "list_models", target_url: &target_url, method: "GET" };

        let mut outbound = OutboundRequest::new(Method::GET, target_url.clone());
        outbound.headers = headers;
        outbound.credential = credential;

        let upstream = match self.upstream.send(outbound).await {
            Ok(upstream) => upstream,
            Err(e) => return error_response(&e, ctx),
        };

        let status = upstream.status();
        let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
        let body = match upstream.bytes().await {
            Ok(body) => body,
            Err(e) => return error_response(&UpstreamError::from(e), ctx),
        };

        if !status.is_success() {
            let err = UpstreamError::status(status.as_u16(), String::from_utf8_lossy(&body));
            return error_response(&err, ctx);
        }

        let listing = CachedListing { content_type, body };
        self.models_cache.insert(MODELS_CACHE_KEY, listing.clone(), self.models_ttl);
        listing_response(listing)
    }

    async fn forward(&self, endpoint: OpenAiEndpoint, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let target_url = self.upstream.build_openai_url(endpoint.suffix());
        let (headers, credential) = self.outbound_headers(&parts.headers);

        let outbound_body = match endpoint.schema() {
            Some(schema) => {
                let bytes = match axum::body::to_bytes(body, MAX_OPENAI_BODY_BYTES).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read request body");
                        return invalid_request(vec![format!("body: {}", e)]);
                    },
                };
                if let Err(violations) = validate_payload(&bytes, schema) {
                    tracing::warn!(?endpoint, ?violations, "Rejected invalid OpenAI request");
                    return invalid_request(violations);
                }
                reqwest::Body::from(bytes)
            },
            None => reqwest::Body::wrap_stream(body.into_data_stream()),
        };

        let mut outbound = OutboundRequest::new(parts.method.clone(), target_url.clone());
        outbound.headers = headers;
        outbound.credential = credential;
        if parts.method != Method::GET && parts.method != Method::HEAD {
            outbound.body = Some(outbound_body);
        }

        match self.upstream.send(outbound).await {
            Ok(upstream) => relay_response(upstream),
            Err(e) => error_response(
                &e,
                FailureContext {
                    context: "openai_forward",
                    target_url: &target_url,
                    method: parts.method.as_str(),
                },
            ),
        }
    }
}

#[async_trait]
impl OpenAiCompat for GeminiOpenAiBridge {
    async fn handle(&self, endpoint: OpenAiEndpoint, request: Request) -> Response {
        match endpoint {
            OpenAiEndpoint::Models => self.list_models(request.headers()).await,
            _ => self.forward(endpoint, request).await,
        }
    }
}

fn listing_response(listing: CachedListing) -> Response {
    let mut response = Response::new(Body::from(listing.body));
    if let Some(content_type) = listing.content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

/// OpenAI-style 400 body listing every violation.
fn invalid_request(violations: Vec<String>) -> Response {
    let body = json!({
        "error": {
            "message": format!("Invalid request: {}", violations.join("; ")),
            "type": "invalid_request_error",
            "code": "validation_error",
            "param": null,
            "details": violations,
        }
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
