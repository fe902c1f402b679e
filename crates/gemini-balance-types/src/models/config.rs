//! Gateway configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1beta";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RATE_LIMIT_CAPACITY: u64 = 10;
pub const DEFAULT_RATE_LIMIT_REFILL_RATE: u64 = 5;
pub const DEFAULT_MODELS_CACHE_TTL_MS: u64 = 3_600_000;

/// Runtime configuration for the dispatch pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GatewayConfig {
    /// Upstream base URL (scheme + host, no trailing slash)
    #[validate(url)]
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,
    /// API version path segment appended to the base URL
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Outbound call deadline in milliseconds
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Token bucket capacity
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_rate_limit_capacity")]
    pub rate_limit_capacity: u64,
    /// Token bucket refill rate, tokens per second
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_rate_limit_refill_rate")]
    pub rate_limit_refill_rate: u64,
    /// TTL of the cached model listing, milliseconds
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_models_cache_ttl_ms")]
    pub models_cache_ttl_ms: u64,
    /// Log every completed request at INFO
    #[serde(default)]
    pub request_logging: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: default_upstream_base_url(),
            api_version: default_api_version(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            rate_limit_capacity: DEFAULT_RATE_LIMIT_CAPACITY,
            rate_limit_refill_rate: DEFAULT_RATE_LIMIT_REFILL_RATE,
            models_cache_ttl_ms: DEFAULT_MODELS_CACHE_TTL_MS,
            request_logging: false,
        }
    }
}

impl GatewayConfig {
    /// Base URL joined with the API version, e.g. `https://host/v1beta`.
    pub fn versioned_base(&self) -> String {
        format!("{}/{}", self.upstream_base_url.trim_end_matches('/'), self.api_version)
    }
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

const fn default_rate_limit_capacity() -> u64 {
    DEFAULT_RATE_LIMIT_CAPACITY
}

const fn default_rate_limit_refill_rate() -> u64 {
    DEFAULT_RATE_LIMIT_REFILL_RATE
}

const fn default_models_cache_ttl_ms() -> u64 {
    DEFAULT_MODELS_CACHE_TTL_MS
}
