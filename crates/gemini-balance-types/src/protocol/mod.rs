//! Protocol definitions accepted on the OpenAI-compatible surface.
//!
//! Only the request side is modelled: these types exist to reject malformed
//! payloads before they cost an upstream call.

pub mod openai;

pub use openai::{ChatCompletionsRequest, EmbeddingsRequest, OpenAIRole};
