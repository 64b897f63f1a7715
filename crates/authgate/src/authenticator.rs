//! Token authenticators
//!
//! [`Authenticator`] is the seam the pipeline gate depends on.
//! [`OidcAuthenticator`] is the production implementation: it bootstraps an
//! OIDC provider at start, then verifies every `authorization` credential on
//! each request and records the derived identity on the request context.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --start--> Ready --shutdown--> Stopped
//! ```
//!
//! `authenticate` makes no network calls; everything it needs is fetched by
//! `start`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::claims::{groups_from_claims, subject_from_claims};
use crate::config::OidcConfig;
use crate::context::{AUTHORIZATION, RequestContext};
use crate::error::{AuthError, AuthResult};
use crate::pipeline::Host;
use crate::provider::{ProviderState, TransportConfig};

/// Verifies request credentials and attaches identity to the context
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate the request described by `ctx`
    ///
    /// Returns `Ok(false)` when no credentials were presented, `Ok(true)`
    /// when they were and all of them verified.
    async fn authenticate(&self, ctx: &mut RequestContext) -> AuthResult<bool>;

    /// Prepare the authenticator
    async fn start(&self, host: &dyn Host) -> AuthResult<()>;

    /// Release the authenticator
    async fn shutdown(&self) -> AuthResult<()>;
}

/// OIDC ID token authenticator
#[derive(Debug)]
pub struct OidcAuthenticator {
    config: OidcConfig,
    transport: TransportConfig,
    provider: OnceCell<ProviderState>,
    stopped: AtomicBool,
}

impl OidcAuthenticator {
    /// Create an authenticator; nothing is fetched until [`Authenticator::start`]
    pub fn new(config: OidcConfig) -> Self {
        Self::with_transport(config, TransportConfig::default())
    }

    /// Create an authenticator with custom transport settings
    pub fn with_transport(config: OidcConfig, transport: TransportConfig) -> Self {
        Self {
            config,
            transport,
            provider: OnceCell::new(),
            stopped: AtomicBool::new(false),
        }
    }

    /// The configuration this authenticator was built with
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Provider state, once started
    pub fn provider(&self) -> Option<&ProviderState> {
        self.provider.get()
    }

    /// Whether [`Authenticator::shutdown`] has been called
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn ready_provider(&self) -> AuthResult<&ProviderState> {
        if self.is_stopped() {
            return Err(AuthError::Stopped);
        }
        self.provider.get().ok_or(AuthError::NotStarted)
    }
}

/// Split `<scheme> <token>` and return the token
///
/// The scheme itself is not checked.
fn credential_token(value: &http::HeaderValue) -> AuthResult<&str> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationHeader)?;
    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_scheme), Some(token), None) => Ok(token),
        _ => Err(AuthError::InvalidAuthorizationHeader),
    }
}

#[async_trait]
impl Authenticator for OidcAuthenticator {
    #[tracing::instrument(skip_all, fields(authenticator = "oidc"))]
    async fn authenticate(&self, ctx: &mut RequestContext) -> AuthResult<bool> {
        let values: Vec<_> = ctx.metadata().get_all(AUTHORIZATION).iter().collect();
        if values.is_empty() {
            return Ok(false);
        }

        // Each credential is parsed then verified before the next is looked
        // at. All must pass; the last one determines the identity.
        let mut identity = None;
        for value in values {
            let token = credential_token(value)
                .inspect_err(|_| debug!("Rejected malformed authorization header"))?;
            let provider = self.ready_provider()?;

            let verified = provider.verifier().verify(token).inspect_err(|e| {
                debug!(error = %e, "Token verification failed");
            })?;

            let fallback = match verified.claims.get("sub") {
                None => "",
                Some(Value::String(sub)) => sub.as_str(),
                Some(_) => return Err(AuthError::ClaimsExtraction),
            };

            let subject =
                subject_from_claims(&verified.claims, self.config.username_claim(), fallback)?;
            let groups = groups_from_claims(&verified.claims, self.config.groups_claim())?;
            identity = Some((subject, groups));
        }

        if let Some((subject, groups)) = identity {
            debug!(subject = %subject, groups = ?groups, "Request authenticated");
            ctx.set_identity(subject, groups);
        }
        Ok(true)
    }

    #[tracing::instrument(skip_all, fields(authenticator = "oidc"))]
    async fn start(&self, _host: &dyn Host) -> AuthResult<()> {
        if self.is_stopped() {
            return Err(AuthError::Stopped);
        }
        if self.provider.initialized() {
            return Err(AuthError::AlreadyStarted);
        }

        let state = ProviderState::bootstrap_with(&self.config, &self.transport)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to start OIDC authenticator"))?;

        self.provider
            .set(state)
            .map_err(|_| AuthError::AlreadyStarted)
    }

    #[tracing::instrument(skip_all, fields(authenticator = "oidc"))]
    async fn shutdown(&self) -> AuthResult<()> {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            debug!("OIDC authenticator stopped");
        }
        Ok(())
    }
}
