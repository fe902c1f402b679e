// Handlers module - request handlers per surface

pub mod common;
pub mod gemini;
pub mod openai;
pub mod verify;

pub use openai::{GeminiOpenAiBridge, OpenAiCompat, OpenAiEndpoint};
pub use verify::{CredentialVerifier, UpstreamVerifier};
