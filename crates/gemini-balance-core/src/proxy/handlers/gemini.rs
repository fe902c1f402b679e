// Native Gemini passthrough for `/models...` paths.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    response::Response,
};

use super::common::relay_response;
use crate::proxy::common::credential::select_credential;
use crate::proxy::common::error_classifier::{error_response, FailureContext};
use crate::proxy::common::header_constants::X_GOOG_API_KEY;
use crate::proxy::server::AppState;
use crate::proxy::upstream::OutboundRequest;

/// Keep `content-type`, substitute one selected key for the inbound list,
/// drop everything else.
pub(crate) fn outbound_headers(
    inbound: &HeaderMap,
    state: &AppState,
) -> (HeaderMap, Option<String>) {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = inbound.get(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, content_type.clone());
    }

    let credential = inbound
        .get(X_GOOG_API_KEY)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| select_credential(raw, state.credentials.as_ref()));

    if let Some(key) = credential.as_deref() {
        match HeaderValue::from_str(key) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(X_GOOG_API_KEY), value);
            },
            Err(e) => tracing::warn!(error = %e, "Selected API key is not a valid header value"),
        }
    }

    (headers, credential)
}

pub async fn handle_forward(state: &AppState, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let target_url = state.upstream.build_url(parts.uri.path(), parts.uri.query());
    let (headers, credential) = outbound_headers(&parts.headers, state);

    let mut outbound = OutboundRequest::new(parts.method.clone(), target_url.clone());
    outbound.headers = headers;
    outbound.credential = credential;
    if parts.method != Method::GET && parts.method != Method::HEAD {
        outbound.body = Some(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    match state.upstream.send(outbound).await {
        Ok(upstream) => {
            tracing::debug!(
                status = upstream.status().as_u16(),
                headers = ?upstream.headers(),
                "Relaying upstream response"
            );
            relay_response(upstream)
        },
        Err(e) => error_response(
            &e,
            FailureContext {
                context: "handle_forward",
                target_url: &target_url,
                method: parts.method.as_str(),
            },
        ),
    }
}
