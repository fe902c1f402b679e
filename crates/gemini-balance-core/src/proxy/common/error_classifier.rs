//! Upstream failure classification. Maps every failure signal onto the
//! closed [`ErrorCategory`] set and a fixed client-facing response.
//!
//! The raw error is logged server-side; the client only sees the category's
//! opaque message and status.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use gemini_balance_types::ErrorCategory;

use crate::proxy::upstream::UpstreamError;

/// Where a failure happened, attached to its log line.
#[derive(Debug, Clone, Copy)]
pub struct FailureContext<'a> {
    /// Calling site, e.g. `forward_gemini`.
    pub context: &'a str,
    pub target_url: &'a str,
    pub method: &'a str,
}

/// Reduce a failure to its category.
///
/// Priority: explicit status (401/403, 429, other 4xx, 5xx), then
/// connect failure, then the deadline, then unknown.
pub fn classify(err: &UpstreamError) -> ErrorCategory {
    match err {
        UpstreamError::Status { status, .. } => match status {
            401 | 403 => ErrorCategory::Auth,
            429 => ErrorCategory::RateLimit,
            400..=499 => ErrorCategory::Validation,
            500..=599 => ErrorCategory::Server,
            _ => ErrorCategory::Unknown,
        },
        UpstreamError::Connect(_) => ErrorCategory::Network,
        UpstreamError::Timeout { .. } => ErrorCategory::Timeout,
        UpstreamError::Transport(_) | UpstreamError::Request(_) => ErrorCategory::Unknown,
    }
}

/// Classify and log. Client-recoverable or external categories log at WARN,
/// internal faults at ERROR.
pub fn classify_and_log(err: &UpstreamError, ctx: FailureContext<'_>) -> ErrorCategory {
    let category = classify(err);
    let timestamp = chrono::Utc::now().to_rfc3339();

    if category.is_external() {
        tracing::warn!(
            %timestamp,
            context = ctx.context,
            %category,
            error.name = err.name(),
            error.message = %err,
            error.detail = ?err,
            target_url = ctx.target_url,
            request_method = ctx.method,
            "Upstream request failed"
        );
    } else {
        tracing::error!(
            %timestamp,
            context = ctx.context,
            %category,
            error.name = err.name(),
            error.message = %err,
            error.detail = ?err,
            target_url = ctx.target_url,
            request_method = ctx.method,
            "Upstream request failed"
        );
    }

    category
}

/// Fixed plain-text response for a category.
pub fn category_response(category: ErrorCategory) -> Response {
    let status = StatusCode::from_u16(category.external_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "text/plain")], category.external_message()).into_response()
}

/// Classify, log, and render the client response in one step.
pub fn error_response(err: &UpstreamError, ctx: FailureContext<'_>) -> Response {
    category_response(classify_and_log(err, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FailureContext<'static> {
        FailureContext { context: "test", target_url: "http://upstream/v1beta/models", method: "GET" }
    }

    #[test]
    fn test_status_priority() {
        assert_eq!(classify(&UpstreamError::status(401, "")), ErrorCategory::Auth);
        assert_eq!(classify(&UpstreamError::status(403, "")), ErrorCategory::Auth);
        assert_eq!(classify(&UpstreamError::status(429, "")), ErrorCategory::RateLimit);
        assert_eq!(classify(&UpstreamError::status(400, "")), ErrorCategory::Validation);
        assert_eq!(classify(&UpstreamError::status(404, "")), ErrorCategory::Validation);
        assert_eq!(classify(&UpstreamError::status(500, "")), ErrorCategory::Server);
        assert_eq!(classify(&UpstreamError::status(503, "")), ErrorCategory::Server);
    }

    #[test]
    fn test_non_status_signals() {
        assert_eq!(
            classify(&UpstreamError::Connect("dns error: no such host".to_string())),
            ErrorCategory::Network
        );
        assert_eq!(classify(&UpstreamError::Timeout { after_ms: 30_000 }), ErrorCategory::Timeout);
        assert_eq!(
            classify(&UpstreamError::Transport("connection reset".to_string())),
            ErrorCategory::Unknown
        );
        // Message text never drives classification.
        assert_eq!(
            classify(&UpstreamError::Transport("timeout while fetching".to_string())),
            ErrorCategory::Unknown
        );
    }

    #[tokio::test]
    async fn test_401_response_hides_upstream_text() {
        let err = UpstreamError::status(
            401,
            r#"{"error":{"message":"API key not valid for user@example.com"}}"#,
        );
        let response = error_response(&err, ctx());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/plain")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Authentication Error: Invalid API Key");
    }

    #[tokio::test]
    async fn test_server_error_is_generic() {
        let response = error_response(&UpstreamError::status(502, "bad gateway at 10.0.0.3"), ctx());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn test_rate_limit_and_validation_pairs() {
        let response = error_response(&UpstreamError::status(429, "slow down"), ctx());
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = error_response(&UpstreamError::status(422, "bad field"), ctx());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Bad Request: Invalid request parameters");
    }

    #[tokio::test]
    async fn test_network_response() {
        let response = error_response(&UpstreamError::Connect("refused".to_string()), ctx());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Network Error: Unable to reach upstream");
    }
}
