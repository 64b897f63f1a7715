//! OpenID Connect provider metadata

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// OpenID Connect Discovery 1.0 provider metadata
///
/// Only the fields the verifier needs are required; the rest are kept for
/// logging and for callers that want to inspect the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier; must equal the configured issuer URL
    pub issuer: String,

    /// URL of the provider's JSON Web Key Set
    pub jwks_uri: String,

    /// Authorization endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// UserInfo endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// Algorithms the provider signs ID tokens with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Supported scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes_supported: Vec<String>,

    /// Supported claims
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims_supported: Vec<String>,
}

/// Algorithms accepted when the provider does not advertise any
const DEFAULT_ALGORITHMS: &[Algorithm] = &[Algorithm::RS256];

impl ProviderMetadata {
    /// Check the document against the issuer it was fetched for
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::IssuerMismatch`] if the issuers differ, or
    /// [`DiscoveryError::InvalidDocument`] if `jwks_uri` is empty.
    pub fn validate(&self, expected_issuer: &str) -> Result<(), DiscoveryError> {
        if self.issuer != expected_issuer {
            return Err(DiscoveryError::IssuerMismatch {
                expected: expected_issuer.to_string(),
                actual: self.issuer.clone(),
            });
        }
        if self.jwks_uri.is_empty() {
            return Err(DiscoveryError::InvalidDocument(
                "jwks_uri must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Signing algorithms the verifier should accept
    ///
    /// Symmetric and unknown algorithms are dropped. Falls back to RS256 when
    /// the provider lists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoSupportedAlgorithms`] if the provider lists
    /// algorithms but none of them is usable.
    pub fn signing_algorithms(&self) -> Result<Vec<Algorithm>, DiscoveryError> {
        if self.id_token_signing_alg_values_supported.is_empty() {
            return Ok(DEFAULT_ALGORITHMS.to_vec());
        }

        let algorithms: Vec<Algorithm> = self
            .id_token_signing_alg_values_supported
            .iter()
            .filter_map(|name| name.parse::<Algorithm>().ok())
            .filter(is_asymmetric)
            .collect();

        if algorithms.is_empty() {
            return Err(DiscoveryError::NoSupportedAlgorithms(
                self.id_token_signing_alg_values_supported.clone(),
            ));
        }
        Ok(algorithms)
    }
}

fn is_asymmetric(algorithm: &Algorithm) -> bool {
    !matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}
