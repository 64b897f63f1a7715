//! OIDC provider bootstrap
//!
//! Runs once at start:
//!
//! 1. Load the optional issuer CA
//! 2. Build the provider HTTP client
//! 3. Fetch and check the discovery document
//! 4. Fetch the JWKS
//! 5. Build the [`IdTokenVerifier`] for the configured audience
//!
//! Any failure aborts start. Nothing is retried.

pub mod transport;

use tracing::{info, warn};

use crate::config::OidcConfig;
use crate::discovery::{ProviderMetadata, fetch_provider_metadata};
use crate::error::AuthResult;
use crate::jwt::{IdTokenVerifier, fetch_key_set};
use crate::trust::load_issuer_ca;

pub use transport::{TransportConfig, build_http_client};

/// Everything needed to verify tokens, fixed after start
#[derive(Debug, Clone)]
pub struct ProviderState {
    metadata: ProviderMetadata,
    verifier: IdTokenVerifier,
}

impl ProviderState {
    /// Bootstrap with the default transport settings
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Trust`](crate::AuthError::Trust) if the CA cannot be loaded, or
    /// [`AuthError::Discovery`](crate::AuthError::Discovery) if discovery or the JWKS fetch fails.
    pub async fn bootstrap(config: &OidcConfig) -> AuthResult<Self> {
        Self::bootstrap_with(config, &TransportConfig::default()).await
    }

    /// Bootstrap with explicit transport settings
    ///
    /// # Errors
    ///
    /// See [`ProviderState::bootstrap`].
    pub async fn bootstrap_with(
        config: &OidcConfig,
        transport: &TransportConfig,
    ) -> AuthResult<Self> {
        let issuer = config.issuer_url.as_str();

        let trust_anchor = load_issuer_ca(config.issuer_ca_path()).inspect_err(|e| {
            warn!(issuer = issuer, error = %e, "Failed to load issuer CA");
        })?;

        let client = build_http_client(transport, trust_anchor.as_ref())?;

        let metadata = fetch_provider_metadata(&client, issuer)
            .await
            .inspect_err(|e| {
                warn!(issuer = issuer, error = %e, "OIDC discovery failed");
            })?;

        let allowed_algorithms = metadata.signing_algorithms()?;

        let key_set = fetch_key_set(&client, &metadata.jwks_uri)
            .await
            .inspect_err(|e| {
                warn!(issuer = issuer, jwks_uri = %metadata.jwks_uri, error = %e, "JWKS fetch failed");
            })?;

        let verifier = IdTokenVerifier::new(
            issuer,
            config.audience.as_str(),
            key_set,
            allowed_algorithms,
        );

        info!(
            issuer = issuer,
            audience = %config.audience,
            custom_ca = trust_anchor.is_some(),
            algorithms = ?verifier.allowed_algorithms(),
            key_count = verifier.key_count(),
            "OIDC provider ready"
        );

        Ok(Self { metadata, verifier })
    }

    /// Discovered provider metadata
    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// Verifier scoped to the configured audience
    pub fn verifier(&self) -> &IdTokenVerifier {
        &self.verifier
    }
}
