//! Processor Configuration Types
//!
//! The pipeline host deserializes these from its own configuration source.
//! Both snake_case keys and the camelCase spellings used by collector
//! configuration files are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Authentication processor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// OIDC settings; required for the processor to be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<OidcConfig>,
}

/// OIDC issuer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Base URL of the OIDC provider, e.g. `https://auth.example.com`
    #[serde(alias = "issuerURL", alias = "issuerUrl")]
    pub issuer_url: String,

    /// Expected `aud` claim, usually the client ID
    pub audience: String,

    /// PEM file holding the CA that signed the issuer's TLS certificate.
    /// When set, only this CA is trusted for provider calls.
    #[serde(
        alias = "issuerCAPath",
        alias = "issuerCaPath",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer_ca_path: Option<PathBuf>,

    /// Claim holding the username; falls back to `sub` when unset
    #[serde(alias = "usernameClaim", skip_serializing_if = "Option::is_none")]
    pub username_claim: Option<String>,

    /// Claim holding the groups the subject belongs to
    #[serde(alias = "groupsClaim", skip_serializing_if = "Option::is_none")]
    pub groups_claim: Option<String>,
}

impl Config {
    /// Create a config wrapping the given OIDC settings
    pub fn with_oidc(oidc: OidcConfig) -> Self {
        Self { oidc: Some(oidc) }
    }

    /// Check that every required setting is present
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking the OIDC section,
    /// then the audience, then the issuer URL.
    pub fn validate(&self) -> Result<&OidcConfig, ConfigError> {
        let oidc = self.oidc.as_ref().ok_or(ConfigError::NoOidcProvided)?;
        oidc.validate()?;
        Ok(oidc)
    }
}

impl OidcConfig {
    /// Create a config with the two required settings
    pub fn new(issuer_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            audience: audience.into(),
            ..Default::default()
        }
    }

    /// Set the issuer CA path
    #[must_use]
    pub fn with_issuer_ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.issuer_ca_path = Some(path.into());
        self
    }

    /// Set the username claim
    #[must_use]
    pub fn with_username_claim(mut self, claim: impl Into<String>) -> Self {
        self.username_claim = Some(claim.into());
        self
    }

    /// Set the groups claim
    #[must_use]
    pub fn with_groups_claim(mut self, claim: impl Into<String>) -> Self {
        self.groups_claim = Some(claim.into());
        self
    }

    /// Validate required fields
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoAudience`], [`ConfigError::NoIssuerUrl`] or
    /// [`ConfigError::InvalidIssuerUrl`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audience.is_empty() {
            return Err(ConfigError::NoAudience);
        }
        if self.issuer_url.is_empty() {
            return Err(ConfigError::NoIssuerUrl);
        }
        url::Url::parse(&self.issuer_url).map_err(|e| ConfigError::InvalidIssuerUrl {
            url: self.issuer_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// CA path, treating an empty path as unset
    pub fn issuer_ca_path(&self) -> Option<&Path> {
        self.issuer_ca_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Username claim, treating an empty name as unset
    pub fn username_claim(&self) -> Option<&str> {
        self.username_claim.as_deref().filter(|c| !c.is_empty())
    }

    /// Groups claim, treating an empty name as unset
    pub fn groups_claim(&self) -> Option<&str> {
        self.groups_claim.as_deref().filter(|c| !c.is_empty())
    }
}
