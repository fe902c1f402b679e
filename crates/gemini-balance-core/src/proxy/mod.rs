//! Proxy module - request dispatch pipeline
//!
//! - Admission control (token bucket) and the outbound deadline
//! - Failure classification with fixed client-facing responses
//! - Request metrics and the `/metrics` summary
//! - Native Gemini passthrough, OpenAI bridge, key verification

pub mod common;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod monitor;
pub mod server;
pub mod timeout;
pub mod token_bucket;
pub mod upstream;

pub use common::{CredentialPolicy, RandomCredential, TtlCache};
pub use monitor::{MetricsRecorder, RequestTimer};
pub use server::{build_router, route_for, AppState, GatewayServer, Route, ServerStartConfig};
pub use timeout::TimeoutGuard;
pub use token_bucket::TokenBucket;
pub use upstream::{OutboundRequest, UpstreamClient, UpstreamError};
