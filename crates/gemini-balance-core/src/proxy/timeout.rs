//! Deadline around a single outbound call.
//!
//! The guarded future is dropped when the deadline fires, which cancels the
//! in-flight request. The timer itself lives inside `tokio::time::timeout`
//! and is released together with it on every exit path.

use std::future::Future;
use std::time::Duration;

use crate::proxy::upstream::UpstreamError;

#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    limit: Duration,
}

impl TimeoutGuard {
    pub const fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Run `call` under the deadline.
    ///
    /// A call that finishes in time returns its own outcome unchanged, including
    /// transport errors. A call that does not is cancelled and reported as
    /// [`UpstreamError::Timeout`].
    pub async fn run<F, T, E>(&self, call: F) -> Result<T, UpstreamError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<UpstreamError>,
    {
        match tokio::time::timeout(self.limit, call).await {
            Ok(outcome) => outcome.map_err(Into::into),
            Err(_) => {
                let after_ms = self.limit.as_millis() as u64;
                tracing::debug!(after_ms, "Outbound call cancelled by deadline");
                Err(UpstreamError::Timeout { after_ms })
            },
        }
    }
}
