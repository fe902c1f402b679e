//! Shared data structures for the gateway.

mod config;
mod stats;

pub use config::{
    GatewayConfig, DEFAULT_API_VERSION, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MODELS_CACHE_TTL_MS,
    DEFAULT_RATE_LIMIT_CAPACITY, DEFAULT_RATE_LIMIT_REFILL_RATE, DEFAULT_UPSTREAM_BASE_URL,
};
pub use stats::MetricsSummary;
