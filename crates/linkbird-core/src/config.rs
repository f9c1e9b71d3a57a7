//! Configuration types shared between the framework and transports.

use std::time::Duration;

/// Default timeout for outbound HTTP requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on how much of a response body is read.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Settings for the shared outbound HTTP client.
///
/// One client is built from this at startup and shared read-only by every
/// handler task.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Skip certificate validation.
    ///
    /// Link previews must still render for sites with self-signed or expired
    /// certificates, so deployments normally leave this on.
    pub accept_invalid_certs: bool,
    /// Maximum number of body bytes read when scraping a page.
    pub max_body_bytes: usize,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            accept_invalid_certs: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: concat!("linkbird/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
