// Common utilities shared by handlers

pub mod client_builder;
pub mod credential;
pub mod error_classifier;
pub mod header_constants;
pub mod ttl_cache;
pub mod validation;

pub use credential::{mask_credential, select_credential, CredentialPolicy, RandomCredential};
pub use error_classifier::{classify, classify_and_log, error_response, FailureContext};
pub use ttl_cache::TtlCache;
pub use validation::{validate_payload, PayloadSchema};
