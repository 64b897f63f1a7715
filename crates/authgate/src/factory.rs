//! Processor factory
//!
//! Entry point the pipeline host uses to register and build the processor.

use tracing::debug;

use crate::authenticator::OidcAuthenticator;
use crate::config::Config;
use crate::error::ConfigError;
use crate::pipeline::TracesConsumer;
use crate::processor::AuthenticationProcessor;

/// Type name the processor is registered under
pub const TYPE_STR: &str = "authentication";

/// Builds authentication processors
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorFactory;

impl ProcessorFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }

    /// Registered type name
    pub fn type_str(&self) -> &'static str {
        TYPE_STR
    }

    /// Default configuration; not valid until `oidc` is filled in
    pub fn create_default_config(&self) -> Config {
        Config::default()
    }

    /// Validate `config` and build a traces processor feeding `next`
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`Config::validate`].
    pub fn create_traces_processor<C: TracesConsumer>(
        &self,
        config: &Config,
        next: C,
    ) -> Result<AuthenticationProcessor<OidcAuthenticator, C>, ConfigError> {
        let oidc = config.validate()?;
        debug!(
            processor = TYPE_STR,
            issuer = %oidc.issuer_url,
            audience = %oidc.audience,
            "Creating traces processor"
        );
        AuthenticationProcessor::new(config, next)
    }
}
