// Shared handlers and response helpers.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::proxy::common::header_constants::{HOP_BY_HOP_HEADERS, REFERRER_POLICY_VALUE};
use crate::proxy::server::AppState;

pub const ROOT_RESPONSE_MESSAGE: &str =
    "Proxy is Running! More Details: https://github.com/tech-shrimp/gemini-balance-lite";

pub fn handle_root() -> Response {
    (StatusCode::OK, ROOT_RESPONSE_MESSAGE).into_response()
}

pub fn handle_metrics(state: &AppState) -> Response {
    let summary = state.metrics.summarize();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize metrics summary");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        },
    }
}

pub fn handle_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Relay an upstream response: same status, hop-by-hop headers stripped,
/// `Referrer-Policy: no-referrer` set, body streamed as it arrives.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static(REFERRER_POLICY_VALUE));

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
