//! Unified error types for Gemini Balance Core.

use gemini_balance_types::ConfigError;
use thiserror::Error;

/// Errors raised while assembling or running the gateway (not per-request
/// upstream failures, see [`crate::proxy::upstream::UpstreamError`]).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be constructed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system / socket I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gateway setup operations.
pub type AppResult<T> = Result<T, AppError>;
