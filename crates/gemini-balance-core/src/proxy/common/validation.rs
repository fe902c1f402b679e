//! Request payload validation for the OpenAI-compatible surface.
//!
//! Bodies are parsed into a typed copy only to be checked; the received bytes
//! are what gets forwarded, so unknown fields survive.

use gemini_balance_types::protocol::{ChatCompletionsRequest, EmbeddingsRequest};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    ChatCompletions,
    Embeddings,
}

/// Check `body` against `schema`. On reject, returns one line per violation,
/// sorted, formatted as `path: code` (or `path: message` when set).
pub fn validate_payload(body: &[u8], schema: PayloadSchema) -> Result<(), Vec<String>> {
    match schema {
        PayloadSchema::ChatCompletions => check::<ChatCompletionsRequest>(body),
        PayloadSchema::Embeddings => check::<EmbeddingsRequest>(body),
    }
}

fn check<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<(), Vec<String>> {
    let parsed: T =
        serde_json::from_slice(body).map_err(|e| vec![format!("body: {}", e)])?;
    parsed.validate().map_err(|errors| {
        let mut violations = Vec::new();
        flatten(&errors, "", &mut violations);
        violations.sort();
        violations
    })
}

fn flatten(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let detail =
                        err.message.as_ref().map_or_else(|| err.code.to_string(), |m| m.to_string());
                    out.push(format!("{}: {}", path, detail));
                }
            },
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(inner, &format!("{}[{}]", path, index), out);
                }
            },
        }
    }
}
