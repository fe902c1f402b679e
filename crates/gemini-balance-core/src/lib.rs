//! # Gemini Balance Core
//!
//! Request-dispatch pipeline for the Gemini Balance gateway.
//!
//! ## Architecture
//!
//! ```text
//! gemini-balance-core/src/proxy/
//! ├── token_bucket.rs   # admission control (lazy-refill token bucket)
//! ├── timeout.rs        # deadline around one outbound call
//! ├── monitor.rs        # counters + bounded duration window
//! ├── config.rs         # environment -> GatewayConfig
//! ├── upstream/         # HTTP client, URL building, guarded send
//! ├── common/           # classifier, credentials, headers, cache, validation
//! ├── middleware/       # metrics middleware
//! ├── handlers/         # root, metrics, forward, openai, verify
//! └── server.rs         # AppState + dispatcher
//! ```

pub mod error;
pub mod proxy;

pub use error::{AppError, AppResult};
