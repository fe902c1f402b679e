//! Environment-driven gateway configuration.

use gemini_balance_types::models::{
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MODELS_CACHE_TTL_MS, DEFAULT_RATE_LIMIT_CAPACITY,
    DEFAULT_RATE_LIMIT_REFILL_RATE, DEFAULT_UPSTREAM_BASE_URL,
};
use gemini_balance_types::{ConfigError, GatewayConfig};
use validator::Validate;

pub const ENV_FETCH_TIMEOUT: &str = "FETCH_TIMEOUT";
pub const ENV_RATE_LIMIT_CAPACITY: &str = "RATE_LIMIT_CAPACITY";
pub const ENV_RATE_LIMIT_REFILL_RATE: &str = "RATE_LIMIT_REFILL_RATE";
pub const ENV_MODELS_CACHE_TTL: &str = "MODELS_CACHE_TTL";
pub const ENV_REQUEST_LOGGING: &str = "REQUEST_LOGGING";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";

/// Read the configuration from the process environment.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Build the configuration from an arbitrary variable source.
///
/// Integers that are missing, unparsable or zero fall back to their default.
pub fn from_lookup<F>(lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = GatewayConfig {
        upstream_base_url: base_url(lookup(ENV_GEMINI_BASE_URL)),
        fetch_timeout_ms: positive_or(&lookup, ENV_FETCH_TIMEOUT, DEFAULT_FETCH_TIMEOUT_MS),
        rate_limit_capacity: positive_or(
            &lookup,
            ENV_RATE_LIMIT_CAPACITY,
            DEFAULT_RATE_LIMIT_CAPACITY,
        ),
        rate_limit_refill_rate: positive_or(
            &lookup,
            ENV_RATE_LIMIT_REFILL_RATE,
            DEFAULT_RATE_LIMIT_REFILL_RATE,
        ),
        models_cache_ttl_ms: positive_or(&lookup, ENV_MODELS_CACHE_TTL, DEFAULT_MODELS_CACHE_TTL_MS),
        request_logging: flag(lookup(ENV_REQUEST_LOGGING)),
        ..GatewayConfig::default()
    };

    config.validate().map_err(|e| ConfigError::from_validation_errors(&e))?;
    Ok(config)
}

fn positive_or<F>(lookup: &F, name: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => {
                tracing::warn!(variable = name, value = %raw, default, "Invalid value, using default");
                default
            },
            Ok(value) => value,
        },
    }
}

fn base_url(raw: Option<String>) -> String {
    let url = raw.map(|u| u.trim().trim_end_matches('/').to_string()).unwrap_or_default();
    if url.is_empty() {
        DEFAULT_UPSTREAM_BASE_URL.to_string()
    } else {
        tracing::info!(upstream = %url, "Using custom upstream URL");
        url
    }
}

fn flag(raw: Option<String>) -> bool {
    match raw.as_deref().map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("true") => true,
        Some(value) => value.parse::<i64>().is_ok_and(|n| n != 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.fetch_timeout_ms, 30_000);
        assert_eq!(config.rate_limit_capacity, 10);
        assert_eq!(config.rate_limit_refill_rate, 5);
        assert_eq!(config.models_cache_ttl_ms, 3_600_000);
        assert!(!config.request_logging);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (ENV_FETCH_TIMEOUT, "1500"),
            (ENV_RATE_LIMIT_CAPACITY, " 20 "),
            (ENV_RATE_LIMIT_REFILL_RATE, "2"),
            (ENV_MODELS_CACHE_TTL, "60000"),
            (ENV_REQUEST_LOGGING, "1"),
            (ENV_GEMINI_BASE_URL, "http://127.0.0.1:9000/"),
        ])
        .unwrap();
        assert_eq!(config.fetch_timeout_ms, 1_500);
        assert_eq!(config.rate_limit_capacity, 20);
        assert_eq!(config.rate_limit_refill_rate, 2);
        assert_eq!(config.models_cache_ttl_ms, 60_000);
        assert!(config.request_logging);
        assert_eq!(config.upstream_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_zero_and_garbage_fall_back() {
        let config = load(&[
            (ENV_FETCH_TIMEOUT, "0"),
            (ENV_RATE_LIMIT_CAPACITY, "lots"),
            (ENV_RATE_LIMIT_REFILL_RATE, "-3"),
        ])
        .unwrap();
        assert_eq!(config.fetch_timeout_ms, DEFAULT_FETCH_TIMEOUT_MS);
        assert_eq!(config.rate_limit_capacity, DEFAULT_RATE_LIMIT_CAPACITY);
        assert_eq!(config.rate_limit_refill_rate, DEFAULT_RATE_LIMIT_REFILL_RATE);
    }

    #[test]
    fn test_request_logging_flag() {
        assert!(load(&[(ENV_REQUEST_LOGGING, "true")]).unwrap().request_logging);
        assert!(load(&[(ENV_REQUEST_LOGGING, "TRUE")]).unwrap().request_logging);
        assert!(!load(&[(ENV_REQUEST_LOGGING, "0")]).unwrap().request_logging);
        assert!(!load(&[(ENV_REQUEST_LOGGING, "no")]).unwrap().request_logging);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = load(&[(ENV_GEMINI_BASE_URL, "not a url")]).unwrap_err();
        let ConfigError::ValidationError { field, .. } = err;
        assert_eq!(field, "upstream_base_url");
    }
}
