//! Failure signals produced by an outbound call.

use std::error::Error as StdError;
use thiserror::Error;

/// Raw failure of one upstream attempt, before classification.
///
/// Each variant is an explicit signal for the classifier; nothing downstream
/// inspects message text.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with an error status. `body` is for logs only.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// Connection could not be established (refused, DNS, TLS handshake).
    #[error("Unable to connect to upstream: {0}")]
    Connect(String),

    /// The gateway's own deadline elapsed.
    #[error("Request timeout after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Any other transport failure (reset mid-flight, body error, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The outbound request could not be built.
    #[error("Invalid outbound request: {0}")]
    Request(String),
}

impl UpstreamError {
    /// Short variant name used in structured logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "HttpError",
            Self::Connect(_) => "ConnectError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Transport(_) => "TransportError",
            Self::Request(_) => "RequestError",
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status { status, body: body.into() }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        let detail = error_chain(&e);
        if e.is_connect() {
            Self::Connect(detail)
        } else if let Some(status) = e.status() {
            Self::Status { status: status.as_u16(), body: String::new() }
        } else if e.is_builder() {
            Self::Request(detail)
        } else {
            Self::Transport(detail)
        }
    }
}

/// `outer: inner: root` rendering of an error and its sources.
pub(crate) fn error_chain(e: &dyn StdError) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
