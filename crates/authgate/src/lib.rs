//! # Authgate - OIDC Authentication for Trace Pipelines
//!
//! A pipeline processor that admits a trace batch only when the caller presents
//! a valid OpenID Connect ID token, and records who the caller is on the
//! request context for downstream consumers.
//!
//! ## Architecture
//!
//! - [`trust`] - Optional custom CA for the issuer's TLS certificate
//! - [`provider`] - Bootstrap: HTTP client, discovery, JWKS, verifier
//!   - [`discovery`] - OpenID Connect Discovery document fetch
//!   - [`jwt`] - JWKS fetch and ID token verification
//! - [`claims`] - Subject and groups derived from verified claims
//! - [`authenticator`] - The `Authenticator` trait and `OidcAuthenticator`
//! - [`context`] - Request metadata and identity attributes
//! - [`processor`] - The gate placed in front of the next consumer
//! - [`factory`] - Config validation and processor construction
//! - [`pipeline`] - Host-side traits and the batch type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authgate::{Config, NoopHost, OidcConfig, ProcessorFactory, RequestContext, Traces};
//! # use authgate::{BoxError, TracesConsumer};
//! # struct Exporter;
//! # #[async_trait::async_trait]
//! # impl TracesConsumer for Exporter {
//! #     async fn consume_traces(&self, _: RequestContext, _: Traces) -> Result<(), BoxError> { Ok(()) }
//! # }
//! # tokio_test::block_on(async {
//! let config = Config::with_oidc(
//!     OidcConfig::new("https://auth.example.com", "collector").with_groups_claim("groups"),
//! );
//!
//! let processor = ProcessorFactory::new().create_traces_processor(&config, Exporter)?;
//! processor.start(&NoopHost).await?;
//!
//! let mut headers = http::HeaderMap::new();
//! headers.insert(http::header::AUTHORIZATION, "Bearer eyJhbGciOi...".parse()?);
//! processor
//!     .consume_traces(RequestContext::new(headers), Traces::default())
//!     .await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```
//!
//! ## Behavior
//!
//! - No `authorization` metadata: rejected with "authentication required"
//! - Malformed metadata, failed verification or unmappable claims: rejected
//!   with the underlying error
//! - Several credentials: all must verify, the last one sets the identity
//! - Provider discovery and the JWKS fetch happen once, at start

pub mod authenticator;
pub mod claims;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod jwt;
pub mod pipeline;
pub mod processor;
pub mod provider;
pub mod trust;

#[doc(inline)]
pub use authenticator::{Authenticator, OidcAuthenticator};
#[doc(inline)]
pub use claims::{ClaimSet, groups_from_claims, subject_from_claims};
#[doc(inline)]
pub use config::{Config, OidcConfig};
#[doc(inline)]
pub use context::{Groups, RequestContext, Subject};
#[doc(inline)]
pub use error::{
    AuthError, AuthResult, ClaimsError, ConfigError, DiscoveryError, ProcessorError, TrustError,
    VerifyError,
};
#[doc(inline)]
pub use factory::{ProcessorFactory, TYPE_STR};
#[doc(inline)]
pub use pipeline::{BoxError, Host, NoopHost, ProcessorCapabilities, Traces, TracesConsumer};
#[doc(inline)]
pub use processor::AuthenticationProcessor;
#[doc(inline)]
pub use provider::ProviderState;
#[doc(inline)]
pub use trust::{TrustAnchor, load_issuer_ca};
