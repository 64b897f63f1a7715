//! # Discovery Document Fetcher
//!
//! Single-shot HTTP fetch of the OpenID Connect discovery document. The
//! document is read once at startup and never cached or refreshed here.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::ProviderMetadata;
use crate::error::DiscoveryError;

/// Maximum size of a discovery document or key set (64 KB)
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// Well-known path appended to the issuer
const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Build the discovery URL for an issuer
///
/// Always: `{issuer without trailing slash}/.well-known/openid-configuration`
pub fn discovery_url(issuer: &str) -> String {
    format!("{}{}", issuer.trim_end_matches('/'), WELL_KNOWN_PATH)
}

/// Fetch and validate the provider metadata for `issuer`
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the request fails, the status is not a
/// success, the body is too large or malformed, or the document names a
/// different issuer.
pub async fn fetch_provider_metadata(
    client: &reqwest::Client,
    issuer: &str,
) -> Result<ProviderMetadata, DiscoveryError> {
    let url = discovery_url(issuer);
    debug!(issuer = issuer, discovery_url = %url, "Fetching OIDC discovery document");

    let metadata: ProviderMetadata =
        get_json(client, &url, DiscoveryError::InvalidDocument).await?;

    metadata.validate(issuer).inspect_err(|e| {
        warn!(issuer = issuer, error = %e, "Discovery document rejected");
    })?;

    debug!(
        issuer = issuer,
        jwks_uri = %metadata.jwks_uri,
        "Fetched OIDC discovery document"
    );
    Ok(metadata)
}

/// GET `url` and decode the body as JSON, enforcing [`MAX_RESPONSE_SIZE`]
///
/// `malformed` builds the error returned when the body does not decode.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    malformed: fn(String) -> DiscoveryError,
) -> Result<T, DiscoveryError> {
    let request_failed = |source| DiscoveryError::Request {
        url: url.to_string(),
        source,
    };
    let too_large = || DiscoveryError::ResponseTooLarge {
        url: url.to_string(),
        limit: MAX_RESPONSE_SIZE,
    };

    let response = client
        .get(url)
        .header(http::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(request_failed)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(content_length) = response.content_length()
        && content_length > MAX_RESPONSE_SIZE as u64
    {
        return Err(too_large());
    }

    let body = response.bytes().await.map_err(request_failed)?;
    if body.len() > MAX_RESPONSE_SIZE {
        return Err(too_large());
    }

    serde_json::from_slice(&body).map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_discovery_url_building() {
        assert_eq!(
            discovery_url("https://example.com"),
            "https://example.com/.well-known/openid-configuration"
        );
        assert_eq!(
            discovery_url("https://example.com/"),
            "https://example.com/.well-known/openid-configuration"
        );
        assert_eq!(
            discovery_url("https://example.com/realms/main"),
            "https://example.com/realms/main/.well-known/openid-configuration"
        );
    }

    #[tokio::test]
    async fn test_fetch_valid_document() {
        let server = MockServer::start().await;
        let issuer = server.uri();
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": issuer,
                "jwks_uri": format!("{issuer}/keys"),
            })))
            .mount(&server)
            .await;

        let metadata = fetch_provider_metadata(&reqwest::Client::new(), &issuer)
            .await
            .unwrap();

        assert_eq!(metadata.jwks_uri, format!("{issuer}/keys"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_provider_metadata(&reqwest::Client::new(), &server.uri()).await;

        assert!(matches!(
            result,
            Err(DiscoveryError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_malformed_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = fetch_provider_metadata(&reqwest::Client::new(), &server.uri()).await;

        assert!(matches!(result, Err(DiscoveryError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_fetch_oversized_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)),
            )
            .mount(&server)
            .await;

        let result = fetch_provider_metadata(&reqwest::Client::new(), &server.uri()).await;

        assert!(matches!(
            result,
            Err(DiscoveryError::ResponseTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_issuer_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": "https://someone-else.example.com",
                "jwks_uri": "https://someone-else.example.com/keys",
            })))
            .mount(&server)
            .await;

        let result = fetch_provider_metadata(&reqwest::Client::new(), &server.uri()).await;

        assert!(matches!(result, Err(DiscoveryError::IssuerMismatch { .. })));
    }
}
