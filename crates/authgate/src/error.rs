//! Error types for the authentication gate
//!
//! Each concern owns its own error enum. [`AuthError`] aggregates the ones an
//! authenticator can produce, and [`ProcessorError`] is what the pipeline host
//! sees. Verification and claims-mapping errors are carried through unchanged
//! so callers can match on the exact cause.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors, detected before the processor is built
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The `oidc` section is missing
    #[error("no OIDC information provided")]
    NoOidcProvided,

    /// The audience (client ID) is missing or empty
    #[error("no audience provided for the OIDC configuration")]
    NoAudience,

    /// The issuer URL is missing or empty
    #[error("no issuer URL provided for the OIDC configuration")]
    NoIssuerUrl,

    /// The issuer URL does not parse
    #[error("invalid issuer URL {url:?}: {reason}")]
    InvalidIssuerUrl {
        /// The configured value
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Failures loading the custom issuer CA
#[derive(Debug, Error)]
pub enum TrustError {
    /// The CA file could not be read
    #[error("could not read the CA file {path:?}: {source}")]
    Read {
        /// Path to the CA file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The CA file exists but has no content
    #[error("could not read the CA file {path:?}: empty file")]
    Empty {
        /// Path to the CA file
        path: PathBuf,
    },

    /// No PEM block could be decoded
    #[error("cannot decode the contents of the CA file {path:?}")]
    NoPemBlock {
        /// Path to the CA file
        path: PathBuf,
    },

    /// More than one PEM block was found
    #[error("the CA file {path:?} must contain exactly one PEM block, found {count}")]
    MultiplePemBlocks {
        /// Path to the CA file
        path: PathBuf,
        /// Number of blocks decoded
        count: usize,
    },

    /// The PEM block is not a certificate
    #[error("the PEM block in {path:?} is not a certificate")]
    NotACertificate {
        /// Path to the CA file
        path: PathBuf,
    },

    /// The certificate failed to parse as a trust anchor
    #[error("invalid certificate in {path:?}: {reason}")]
    InvalidCertificate {
        /// Path to the CA file
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// Provider discovery and key set errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request did not complete
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// Transport error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code
        status: u16,
    },

    /// Response body over the size limit
    #[error("response from {url} exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Requested URL
        url: String,
        /// Configured limit
        limit: usize,
    },

    /// Discovery document is not valid JSON or misses required fields
    #[error("malformed provider metadata: {0}")]
    InvalidDocument(String),

    /// Discovered issuer differs from the configured one
    #[error("issuer did not match the issuer returned by provider, expected {expected:?} got {actual:?}")]
    IssuerMismatch {
        /// Configured issuer
        expected: String,
        /// Issuer in the discovery document
        actual: String,
    },

    /// The JWK set is not valid
    #[error("malformed JWK set: {0}")]
    InvalidKeySet(String),

    /// Keys were published but none of them can be used
    #[error("no usable keys in JWK set at {jwks_uri}")]
    NoUsableKeys {
        /// Location of the key set
        jwks_uri: String,
    },

    /// None of the advertised signing algorithms are usable
    #[error("provider advertises no supported signing algorithms: {0:?}")]
    NoSupportedAlgorithms(Vec<String>),
}

/// Token verification errors
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Error from the JWT library (signature, expiry, issuer, audience, format)
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The token header names an algorithm the provider does not allow
    #[error("token signed with unexpected algorithm {0:?}")]
    AlgorithmNotAllowed(jsonwebtoken::Algorithm),

    /// The key ID in the header is not in the provider's key set
    #[error("key ID {0:?} not found in the provider key set")]
    UnknownKeyId(String),

    /// No key in the key set could verify the token
    #[error("failed to verify signature: no matching key")]
    NoMatchingKey,
}

/// Claims-to-identity mapping errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    /// Configured username claim is absent
    #[error("username claim from the OIDC configuration not found on the token returned by the OIDC provider")]
    UsernameClaimNotFound,

    /// Username claim is present but not a string
    #[error("the username returned by the OIDC provider isn't a regular string")]
    UsernameNotString,

    /// Configured groups claim is absent
    #[error("groups claim from the OIDC configuration not found on the token returned by the OIDC provider")]
    GroupsClaimNotFound,
}

/// Errors surfaced by an authenticator
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Custom CA could not be loaded
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// Discovery or key set fetch failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// An `authorization` value is not `<scheme> <token>`
    #[error("invalid authorization header format")]
    InvalidAuthorizationHeader,

    /// The token did not verify
    #[error(transparent)]
    Verification(#[from] VerifyError),

    /// Claims could not be read from a verified token
    #[error("failed to get the claims from the token issued by the OIDC provider")]
    ClaimsExtraction,

    /// Claims could not be mapped to an identity
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    /// `authenticate` called before `start`
    #[error("authenticator has not been started")]
    NotStarted,

    /// `start` called twice
    #[error("authenticator already started")]
    AlreadyStarted,

    /// Called after `shutdown`
    #[error("authenticator has been shut down")]
    Stopped,
}

/// Errors returned by the pipeline gate
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Authentication failed; the authenticator's error is preserved
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// No credentials were presented
    #[error("authentication required")]
    AuthenticationRequired,

    /// The processor could not be built
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The next consumer rejected the batch
    #[error("next consumer failed: {0}")]
    NextConsumer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias for authenticator operations
pub type AuthResult<T> = Result<T, AuthError>;
