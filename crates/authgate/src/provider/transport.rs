//! HTTP client for provider calls
//!
//! One client is built per authenticator and used for discovery and the JWKS
//! fetch. When a trust anchor is configured it replaces the built-in roots.

use std::time::Duration;

use tracing::debug;

use crate::error::DiscoveryError;
use crate::trust::TrustAnchor;

/// Timeouts and pooling for the provider client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// TCP connect plus TLS handshake
    pub connect_timeout: Duration,
    /// TCP keep-alive interval
    pub tcp_keepalive: Duration,
    /// Idle connections kept per host
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept
    pub idle_timeout: Duration,
    /// Whole-request deadline
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            tcp_keepalive: Duration::from_secs(10),
            max_idle_per_host: 100,
            idle_timeout: Duration::from_secs(90),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Build the client used to talk to the provider
///
/// Redirects are not followed. Proxy settings come from the environment.
///
/// # Errors
///
/// Returns [`DiscoveryError::HttpClient`] if reqwest rejects the certificate or
/// the TLS backend cannot be initialized.
pub fn build_http_client(
    config: &TransportConfig,
    trust_anchor: Option<&TrustAnchor>,
) -> Result<reqwest::Client, DiscoveryError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keepalive)
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(config.idle_timeout)
        .timeout(config.request_timeout);

    if let Some(anchor) = trust_anchor {
        let certificate = anchor
            .to_reqwest_certificate()
            .map_err(DiscoveryError::HttpClient)?;
        builder = builder
            .tls_built_in_root_certs(false)
            .add_root_certificate(certificate);
        debug!("Provider client trusts only the configured issuer CA");
    }

    builder.build().map_err(DiscoveryError::HttpClient)
}
