//! Authentication processor
//!
//! Sits between a receiver and the next consumer. A batch is forwarded only
//! when the authenticator accepts the request; otherwise it is rejected whole.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::authenticator::{Authenticator, OidcAuthenticator};
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{ConfigError, ProcessorError};
use crate::pipeline::{BoxError, Host, ProcessorCapabilities, Traces, TracesConsumer};

/// Gate that authenticates each batch before passing it on
#[derive(Debug)]
pub struct AuthenticationProcessor<A, C> {
    authenticator: Arc<A>,
    next: C,
}

impl<C: TracesConsumer> AuthenticationProcessor<OidcAuthenticator, C> {
    /// Build a processor backed by an [`OidcAuthenticator`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoOidcProvided`] if the `oidc` section is missing.
    pub fn new(config: &Config, next: C) -> Result<Self, ConfigError> {
        let oidc = config.oidc.clone().ok_or(ConfigError::NoOidcProvided)?;
        Ok(Self::with_authenticator(
            Arc::new(OidcAuthenticator::new(oidc)),
            next,
        ))
    }
}

impl<A: Authenticator, C: TracesConsumer> AuthenticationProcessor<A, C> {
    /// Build a processor around any authenticator
    pub fn with_authenticator(authenticator: Arc<A>, next: C) -> Self {
        Self {
            authenticator,
            next,
        }
    }

    /// The authenticator guarding this processor
    pub fn authenticator(&self) -> &Arc<A> {
        &self.authenticator
    }

    /// The processor never modifies batches
    pub fn capabilities(&self) -> ProcessorCapabilities {
        ProcessorCapabilities {
            mutates_consumed_data: false,
        }
    }

    /// Start the authenticator
    ///
    /// # Errors
    ///
    /// Returns the authenticator's start error.
    pub async fn start(&self, host: &dyn Host) -> Result<(), ProcessorError> {
        Ok(self.authenticator.start(host).await?)
    }

    /// Shut the authenticator down
    ///
    /// # Errors
    ///
    /// Returns the authenticator's shutdown error.
    pub async fn shutdown(&self) -> Result<(), ProcessorError> {
        Ok(self.authenticator.shutdown().await?)
    }

    /// Authenticate the request, then forward the batch
    ///
    /// # Errors
    ///
    /// - [`ProcessorError::Authentication`] with the authenticator's error
    /// - [`ProcessorError::AuthenticationRequired`] if no credentials were sent
    /// - [`ProcessorError::NextConsumer`] if the next consumer fails
    #[tracing::instrument(skip_all, fields(processor = "authentication", spans = traces.len()))]
    pub async fn consume_traces(
        &self,
        mut ctx: RequestContext,
        traces: Traces,
    ) -> Result<(), ProcessorError> {
        if !self.authenticator.authenticate(&mut ctx).await? {
            debug!("Rejecting batch without credentials");
            return Err(ProcessorError::AuthenticationRequired);
        }

        self.next
            .consume_traces(ctx, traces)
            .await
            .map_err(ProcessorError::NextConsumer)
    }
}

#[async_trait]
impl<A: Authenticator, C: TracesConsumer> TracesConsumer for AuthenticationProcessor<A, C> {
    async fn consume_traces(&self, ctx: RequestContext, traces: Traces) -> Result<(), BoxError> {
        AuthenticationProcessor::consume_traces(self, ctx, traces)
            .await
            .map_err(Into::into)
    }
}
