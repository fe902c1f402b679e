//! Typed error definitions shared across the gateway.
//!
//! - [`ErrorCategory`] is the closed failure taxonomy every upstream failure
//!   is reduced to before it reaches a client.
//! - [`ConfigError`] covers configuration loading and validation.

mod category;
mod config;

pub use category::ErrorCategory;
pub use config::ConfigError;
