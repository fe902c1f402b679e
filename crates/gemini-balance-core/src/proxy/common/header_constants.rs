//! Standard HTTP header names used across proxy handlers.

/// Gemini credential header; inbound it may carry a comma-separated key list.
pub const X_GOOG_API_KEY: &str = "x-goog-api-key";

/// Headers meaningful for one transport leg only, never relayed to clients.
pub const HOP_BY_HOP_HEADERS: [&str; 4] =
    ["transfer-encoding", "connection", "keep-alive", "content-encoding"];

/// Value set on every relayed upstream response.
pub const REFERRER_POLICY_VALUE: &str = "no-referrer";
