// POST /verify: probe every supplied key against the upstream.

use async_trait::async_trait;
use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use gemini_balance_types::ErrorCategory;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::proxy::common::credential::{mask_credential, parse_credentials};
use crate::proxy::common::error_classifier::{classify_and_log, FailureContext};
use crate::proxy::common::header_constants::X_GOOG_API_KEY;
use crate::proxy::server::AppState;
use crate::proxy::upstream::{OutboundRequest, UpstreamClient, UpstreamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyStatus {
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyVerification {
    /// Masked key.
    pub key: String,
    pub status: KeyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

/// Checks whether one credential is accepted upstream.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, key: &str) -> Result<(), ErrorCategory>;
}

/// Probes `GET {base}/{version}/models?pageSize=1` with the key.
pub struct UpstreamVerifier {
    upstream: Arc<UpstreamClient>,
}

impl UpstreamVerifier {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl CredentialVerifier for UpstreamVerifier {
    async fn verify(&self, key: &str) -> Result<(), ErrorCategory> {
        let target_url = self.upstream.build_url("/models", Some("pageSize=1"));
        let ctx = FailureContext { context: "verify_key", target_url: &target_url, method: "GET" };

        let value = HeaderValue::from_str(key).map_err(|_| ErrorCategory::Validation)?;
        let mut request = OutboundRequest::new(Method::GET, target_url.clone());
        request.headers.insert(HeaderName::from_static(X_GOOG_API_KEY), value);
        request.credential = Some(key.to_string());

        let response = self.upstream.send(request).await.map_err(|e| classify_and_log(&e, ctx))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_and_log(&UpstreamError::status(status.as_u16(), body), ctx))
    }
}

pub async fn handle_verify(state: &AppState, headers: &HeaderMap) -> Response {
    let keys = headers
        .get(X_GOOG_API_KEY)
        .and_then(|v| v.to_str().ok())
        .map(parse_credentials)
        .unwrap_or_default();

    if keys.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No API keys provided" })))
            .into_response();
    }

    let verifier = state.verifier.as_ref();
    let results: Vec<KeyVerification> = join_all(keys.iter().map(|key| async move {
        let outcome = verifier.verify(key).await;
        KeyVerification {
            key: mask_credential(key),
            status: if outcome.is_ok() { KeyStatus::Good } else { KeyStatus::Bad },
            category: outcome.err(),
        }
    }))
    .await;

    let good = results.iter().filter(|r| r.status == KeyStatus::Good).count();
    tracing::info!(total = results.len(), good, "Verified API keys");

    (StatusCode::OK, Json(json!({ "results": results }))).into_response()
}
