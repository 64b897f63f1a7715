//! ID token verification against a fixed key set
//!
//! Checks, in order:
//!
//! 1. The header parses and its `alg` is one the provider advertises
//! 2. The signing key is found by `kid`, or by trying every key when the
//!    header has none
//! 3. Signature, `exp`, `nbf`, `iss` and `aud` via [`jsonwebtoken::decode`]
//!
//! Expiry is strict: a token is rejected as soon as `exp` is in the past.
//! Only `nbf` tolerates clock skew ([`NOT_BEFORE_LEEWAY`]).
//!
//! Errors from `jsonwebtoken` are returned unchanged inside
//! [`VerifyError::Jwt`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::Value;
use tracing::debug;

use crate::claims::ClaimSet;
use crate::error::VerifyError;

/// Clock skew tolerated on `nbf`
pub const NOT_BEFORE_LEEWAY: Duration = Duration::from_secs(300);

/// Claims every ID token must carry
const REQUIRED_CLAIMS: &[&str] = &["exp", "iss", "aud"];

/// A token that passed verification
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// All claims in the payload
    pub claims: ClaimSet,
    /// Key ID from the header, if any
    pub key_id: Option<String>,
    /// Algorithm the token was signed with
    pub algorithm: Algorithm,
    /// Expiry from the `exp` claim
    pub expires_at: Option<SystemTime>,
}

/// Verifies ID tokens for one issuer and audience
#[derive(Debug, Clone)]
pub struct IdTokenVerifier {
    issuer: String,
    audience: String,
    key_set: JwkSet,
    allowed_algorithms: Vec<Algorithm>,
    not_before_leeway: Duration,
}

impl IdTokenVerifier {
    /// Create a verifier with the default `nbf` leeway
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        key_set: JwkSet,
        allowed_algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            key_set,
            allowed_algorithms,
            not_before_leeway: NOT_BEFORE_LEEWAY,
        }
    }

    /// Override the clock skew tolerated on `nbf`
    #[must_use]
    pub fn with_not_before_leeway(mut self, leeway: Duration) -> Self {
        self.not_before_leeway = leeway;
        self
    }

    /// Expected issuer
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Expected audience
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Algorithms accepted in token headers
    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        &self.allowed_algorithms
    }

    /// Number of keys available for verification
    pub fn key_count(&self) -> usize {
        self.key_set.keys.len()
    }

    /// Verify a raw compact-serialized JWT
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the token is malformed, signed with a
    /// disallowed algorithm or unknown key, or fails signature or claim checks.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        let header = decode_header(token)?;

        if !self.allowed_algorithms.contains(&header.alg) {
            debug!(
                algorithm = ?header.alg,
                allowed = ?self.allowed_algorithms,
                "Token algorithm not allowed"
            );
            return Err(VerifyError::AlgorithmNotAllowed(header.alg));
        }

        let validation = self.validation(header.alg);

        let claims = match header.kid.as_deref() {
            Some(kid) => {
                let jwk = self
                    .key_set
                    .find(kid)
                    .ok_or_else(|| VerifyError::UnknownKeyId(kid.to_string()))?;
                let key = DecodingKey::from_jwk(jwk)?;
                decode::<ClaimSet>(token, &key, &validation)?.claims
            }
            None => self.decode_with_any_key(token, &validation)?,
        };

        let expires_at = claims
            .get("exp")
            .and_then(Value::as_u64)
            .map(|exp| UNIX_EPOCH + Duration::from_secs(exp));

        debug!(
            issuer = %self.issuer,
            subject = ?claims.get("sub"),
            algorithm = ?header.alg,
            key_id = ?header.kid,
            "Token verified"
        );

        Ok(VerifiedToken {
            claims,
            key_id: header.kid,
            algorithm: header.alg,
            expires_at,
        })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(REQUIRED_CLAIMS);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // `leeway` widens both `exp` and `nbf`; shifting `exp` back by the
        // same amount leaves expiry without grace.
        let leeway = self.not_before_leeway.as_secs();
        validation.leeway = leeway;
        validation.reject_tokens_expiring_in_less_than = leeway;
        validation
    }

    /// Try each signing key until one verifies the signature
    ///
    /// Claim failures (expiry, issuer, audience) are returned immediately since
    /// they only surface once a key has matched.
    fn decode_with_any_key(
        &self,
        token: &str,
        validation: &Validation,
    ) -> Result<ClaimSet, VerifyError> {
        for jwk in self.key_set.keys.iter().filter(|jwk| is_signing_key(jwk)) {
            let Ok(key) = DecodingKey::from_jwk(jwk) else {
                continue;
            };
            match decode::<ClaimSet>(token, &key, validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) if is_key_mismatch(e.kind()) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(VerifyError::NoMatchingKey)
    }
}

fn is_signing_key(jwk: &Jwk) -> bool {
    !matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption))
}

fn is_key_mismatch(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
    )
}
