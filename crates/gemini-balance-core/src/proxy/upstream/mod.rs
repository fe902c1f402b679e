//! Upstream access: URL construction, admission, and the guarded call.

mod client;
mod error;

#[cfg(test)]
mod tests;

pub use client::{OutboundRequest, UpstreamClient};
pub use error::UpstreamError;
