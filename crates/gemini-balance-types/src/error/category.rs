//! Failure taxonomy and the fixed client-facing response for each category.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NETWORK_ERROR_MESSAGE: &str = "Network Error: Unable to reach upstream";
pub const AUTH_ERROR_MESSAGE: &str = "Authentication Error: Invalid API Key";
pub const RATE_LIMIT_ERROR_MESSAGE: &str = "Rate Limit Exceeded: Too many requests";
pub const VALIDATION_ERROR_MESSAGE: &str = "Bad Request: Invalid request parameters";
pub const TIMEOUT_ERROR_MESSAGE: &str = "Request Timeout: The request took too long";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Upstream could not be reached (connect or DNS failure).
    #[serde(rename = "network_error")]
    Network,
    /// Upstream rejected the credential (401/403).
    #[serde(rename = "authentication_error")]
    Auth,
    /// Upstream throttled the call (429).
    #[serde(rename = "rate_limit_error")]
    RateLimit,
    /// Upstream failed internally (5xx).
    #[serde(rename = "server_error")]
    Server,
    /// Upstream rejected the request shape (other 4xx).
    #[serde(rename = "validation_error")]
    Validation,
    /// The gateway's own deadline elapsed.
    #[serde(rename = "timeout_error")]
    Timeout,
    #[serde(rename = "unknown_error")]
    Unknown,
}

impl ErrorCategory {
    /// HTTP status returned to the client for this category.
    pub const fn external_status(self) -> u16 {
        match self {
            Self::Auth => 401,
            Self::RateLimit => 429,
            Self::Validation => 400,
            Self::Network | Self::Timeout | Self::Server | Self::Unknown => 500,
        }
    }

    /// Message returned to the client for this category.
    pub const fn external_message(self) -> &'static str {
        match self {
            Self::Network => NETWORK_ERROR_MESSAGE,
            Self::Auth => AUTH_ERROR_MESSAGE,
            Self::RateLimit => RATE_LIMIT_ERROR_MESSAGE,
            Self::Validation => VALIDATION_ERROR_MESSAGE,
            Self::Timeout => TIMEOUT_ERROR_MESSAGE,
            Self::Server | Self::Unknown => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Whether the failure originates outside the gateway (client mistake or
    /// external condition) rather than an internal fault. Drives log severity.
    pub const fn is_external(self) -> bool {
        !matches!(self, Self::Server | Self::Unknown)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Auth => "authentication_error",
            Self::RateLimit => "rate_limit_error",
            Self::Server => "server_error",
            Self::Validation => "validation_error",
            Self::Timeout => "timeout_error",
            Self::Unknown => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
