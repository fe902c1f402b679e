//! # Gemini Balance Types
//!
//! Core types, configuration model, and error taxonomy for the Gemini Balance
//! gateway.
//!
//! - **`error`** - Error categories and configuration errors
//! - **`models`** - Gateway configuration and metrics summary
//! - **`protocol`** - OpenAI request schemas used for payload validation
//!
//! ## Architecture Role
//!
//! ```text
//!        gemini-balance-types (this crate)
//!                    │
//!                    ▼
//!         gemini-balance-core
//!                    │
//!                    ▼
//!        gemini-balance-server
//! ```

pub mod error;
pub mod models;
pub mod protocol;

pub use error::{ConfigError, ErrorCategory};
pub use models::{GatewayConfig, MetricsSummary};
