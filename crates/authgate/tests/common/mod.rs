//! Common test utilities for integration tests
//!
//! Provides a mock OIDC provider (discovery + JWKS served by wiremock) with a
//! freshly generated ES256 signing key, plus token and header helpers.

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use authgate::RequestContext;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Audience used by every test token
pub const AUDIENCE: &str = "unit-test";

/// Key ID of the provider's signing key
pub const KEY_ID: &str = "test-key";

/// An EC P-256 signing key with its public JWK
pub struct TestSigningKey {
    pub encoding_key: EncodingKey,
    pub jwk: Value,
}

impl TestSigningKey {
    /// Generate a new key pair
    pub fn generate(kid: &str) -> Self {
        let key_pair = rcgen::KeyPair::generate().expect("Failed to generate key pair");
        let raw = key_pair.public_key_raw();
        // Uncompressed point: 0x04 || x || y
        let (x, y) = raw[1..].split_at(32);

        Self {
            encoding_key: EncodingKey::from_ec_pem(key_pair.serialize_pem().as_bytes())
                .expect("Failed to load signing key"),
            jwk: json!({
                "kty": "EC",
                "crv": "P-256",
                "x": URL_SAFE_NO_PAD.encode(x),
                "y": URL_SAFE_NO_PAD.encode(y),
                "kid": kid,
                "use": "sig",
                "alg": "ES256",
            }),
        }
    }

    /// Sign `claims` with ES256 and the given key ID
    pub fn sign(&self, kid: Option<&str>, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = kid.map(str::to_string);
        encode(&header, claims, &self.encoding_key).expect("Failed to sign token")
    }
}

/// Mock OpenID Connect provider
pub struct MockOidcProvider {
    pub server: MockServer,
    pub issuer: String,
    pub signing_key: TestSigningKey,
}

impl MockOidcProvider {
    /// Start a provider advertising ES256 and publishing one key
    pub async fn start() -> Self {
        Self::start_with(|issuer| discovery_document(issuer, &["ES256"])).await
    }

    /// Start a provider with a custom discovery document
    pub async fn start_with(document: impl FnOnce(&str) -> Value) -> Self {
        let server = MockServer::start().await;
        let issuer = server.uri();
        let signing_key = TestSigningKey::generate(KEY_ID);

        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(document(&issuer)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "keys": [signing_key.jwk] })),
            )
            .mount(&server)
            .await;

        Self {
            server,
            issuer,
            signing_key,
        }
    }

    /// Sign `claims` with the provider's key
    pub fn token(&self, claims: &Value) -> String {
        self.signing_key.sign(Some(KEY_ID), claims)
    }

    /// Claims of a valid token for `sub`
    pub fn claims_for(&self, sub: &str) -> Value {
        json!({
            "sub": sub,
            "name": "John Doe",
            "iss": self.issuer,
            "aud": AUDIENCE,
            "exp": current_timestamp() + 60,
        })
    }
}

/// Discovery document pointing at `{issuer}/jwks`
pub fn discovery_document(issuer: &str, algorithms: &[&str]) -> Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "jwks_uri": format!("{issuer}/jwks"),
        "response_types_supported": ["code", "id_token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": algorithms,
    })
}

/// Request context carrying the given `authorization` values
pub fn context_with(values: &[&str]) -> RequestContext {
    let mut headers = HeaderMap::new();
    for value in values {
        headers.append(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("Invalid header value"),
        );
    }
    RequestContext::new(headers)
}

/// Request context with a bearer token
pub fn bearer(token: &str) -> RequestContext {
    context_with(&[&format!("Bearer {token}")])
}

/// Current Unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Install a test subscriber once per binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
