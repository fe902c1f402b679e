use axum::{
    extract::{Request, State},
    http::Method,
    response::Response,
    Router,
};
use gemini_balance_types::GatewayConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::proxy::common::credential::{CredentialPolicy, RandomCredential};
use crate::proxy::handlers::{
    self, CredentialVerifier, GeminiOpenAiBridge, OpenAiCompat, OpenAiEndpoint, UpstreamVerifier,
};
use crate::proxy::monitor::MetricsRecorder;
use crate::proxy::upstream::UpstreamClient;
use crate::AppResult;

pub const METRICS_PATH: &str = "/metrics";
pub const ROOT_PATHS: [&str; 2] = ["/", "/index.html"];
pub const VERIFY_PATH: &str = "/verify";
pub const FORWARD_PREFIX: &str = "/models";

/// Shared context handed to every request. Cloning is cheap (all `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub metrics: Arc<MetricsRecorder>,
    pub upstream: Arc<UpstreamClient>,
    pub credentials: Arc<dyn CredentialPolicy>,
    pub openai: Arc<dyn OpenAiCompat>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Production wiring: pooled HTTP client, random key choice, default
    /// OpenAI bridge and verifier.
    pub fn new(config: GatewayConfig) -> AppResult<Self> {
        let upstream = Arc::new(UpstreamClient::from_config(&config)?);
        Ok(Self::with_parts(config, upstream, Arc::new(RandomCredential)))
    }

    pub fn with_parts(
        config: GatewayConfig,
        upstream: Arc<UpstreamClient>,
        credentials: Arc<dyn CredentialPolicy>,
    ) -> Self {
        let openai = Arc::new(GeminiOpenAiBridge::new(
            upstream.clone(),
            credentials.clone(),
            Duration::from_millis(config.models_cache_ttl_ms),
        ));
        let verifier = Arc::new(UpstreamVerifier::new(upstream.clone()));
        Self {
            config: Arc::new(config),
            metrics: Arc::new(MetricsRecorder::new()),
            upstream,
            credentials,
            openai,
            verifier,
        }
    }

    pub fn with_openai(mut self, openai: Arc<dyn OpenAiCompat>) -> Self {
        self.openai = openai;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }
}

/// Dispatch target for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Metrics,
    Root,
    Verify,
    OpenAi(OpenAiEndpoint),
    Forward,
    NotFound,
}

/// First match wins: metrics, root, verify (POST only), OpenAI suffixes,
/// `/models` prefix, then 404.
pub fn route_for(method: &Method, path: &str) -> Route {
    if path == METRICS_PATH {
        return Route::Metrics;
    }
    if ROOT_PATHS.contains(&path) {
        return Route::Root;
    }
    if path == VERIFY_PATH && method == Method::POST {
        return Route::Verify;
    }
    if let Some(endpoint) = OpenAiEndpoint::from_path(path) {
        return Route::OpenAi(endpoint);
    }
    if path.starts_with(FORWARD_PREFIX) {
        return Route::Forward;
    }
    Route::NotFound
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let route = route_for(request.method(), request.uri().path());
    tracing::debug!(?route, "Dispatching request");

    match route {
        Route::Metrics => handlers::common::handle_metrics(&state),
        Route::Root => handlers::common::handle_root(),
        Route::Verify => handlers::verify::handle_verify(&state, request.headers()).await,
        Route::OpenAi(endpoint) => state.openai.handle(endpoint, request).await,
        Route::Forward => handlers::gemini::handle_forward(&state, request).await,
        Route::NotFound => handlers::common::handle_not_found(),
    }
}

/// Every path goes through the single dispatcher; no per-path axum routes.
pub fn build_router(state: AppState) -> Router<()> {
    Router::new()
        .fallback(dispatch)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::proxy::middleware::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configuration for starting the Axum server
pub struct ServerStartConfig {
    pub host: String,
    pub port: u16,
    pub state: AppState,
}

/// Axum server instance
pub struct GatewayServer {
    config: ServerStartConfig,
}

impl GatewayServer {
    pub fn new(config: ServerStartConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> AppResult<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let app = build_router(self.config.state);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "Gateway listening");
        axum::serve(listener, app).await?;

        Ok(())
    }
}
