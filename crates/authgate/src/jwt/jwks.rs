//! JWKS (JSON Web Key Set) fetching
//!
//! The key set is read once while the provider is bootstrapped. There is no
//! cache and no refresh; a restart picks up rotated keys.
//!
//! Entries `jsonwebtoken` cannot model (for example X25519 or secp256k1 keys)
//! are skipped, so one exotic key does not hide the usable ones.

use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::discovery::get_json;
use crate::error::DiscoveryError;

/// JWKS document with entries left undecoded
#[derive(Debug, Deserialize)]
struct RawKeySet {
    keys: Vec<Value>,
}

/// Fetch the key set published at `jwks_uri`
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the request fails, the body is not a JWK set
/// document, or keys were published but none of them is usable.
pub async fn fetch_key_set(
    client: &reqwest::Client,
    jwks_uri: &str,
) -> Result<JwkSet, DiscoveryError> {
    debug!(jwks_uri = jwks_uri, "Fetching JWKS");

    let raw: RawKeySet = get_json(client, jwks_uri, DiscoveryError::InvalidKeySet).await?;

    if raw.keys.is_empty() {
        warn!(jwks_uri = jwks_uri, "Provider published an empty JWKS");
        return Ok(JwkSet { keys: Vec::new() });
    }

    let published = raw.keys.len();
    let keys: Vec<Jwk> = raw
        .keys
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Jwk>(entry.clone()) {
            Ok(jwk) => Some(jwk),
            Err(e) => {
                debug!(
                    jwks_uri = jwks_uri,
                    kid = ?entry.get("kid"),
                    kty = ?entry.get("kty"),
                    error = %e,
                    "Skipping unsupported JWK"
                );
                None
            }
        })
        .collect();

    if keys.is_empty() {
        warn!(jwks_uri = jwks_uri, published, "No usable keys in JWKS");
        return Err(DiscoveryError::NoUsableKeys {
            jwks_uri: jwks_uri.to_string(),
        });
    }

    debug!(
        jwks_uri = jwks_uri,
        key_count = keys.len(),
        skipped = published - keys.len(),
        "Fetched JWKS"
    );
    Ok(JwkSet { keys })
}
