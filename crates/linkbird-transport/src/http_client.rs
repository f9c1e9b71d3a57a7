//! The shared outbound HTTP client.

use reqwest::{Client, ClientBuilder};
use tracing::{info, warn};

use linkbird_core::{HttpClientConfig, TransportError, TransportResult};

/// Builds the one client every handler shares.
///
/// The client is immutable once built; handlers receive clones of it through
/// the engine.
pub fn build_http_client(config: &HttpClientConfig) -> TransportResult<Client> {
    if config.accept_invalid_certs {
        warn!("Certificate validation is disabled for outbound requests");
    }

    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| TransportError::InvalidConfig(format!("HTTP client: {e}")))?;

    info!(
        timeout = ?config.timeout,
        accept_invalid_certs = config.accept_invalid_certs,
        "HTTP client ready"
    );
    Ok(client)
}
