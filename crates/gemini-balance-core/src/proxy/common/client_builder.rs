use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client.
///
/// No overall timeout is set here: the outbound deadline belongs to
/// [`crate::proxy::timeout::TimeoutGuard`], which must be the only source of
/// timeout failures.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT).tcp_nodelay(true).build()
}
