// Per-request timing: every request, whichever handler answers it, is
// recorded exactly once in the metrics window.

use crate::proxy::server::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", %request_id, %method, %path);

    // Dropped without `complete` if the client disconnects mid-handler.
    let timer = state.metrics.start();
    let response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();
    let duration_ms = timer.complete(status);

    if state.config.request_logging {
        span.in_scope(|| tracing::info!(status, duration_ms, "Request completed"));
    } else {
        span.in_scope(|| tracing::debug!(status, duration_ms, "Request completed"));
    }

    response
}
