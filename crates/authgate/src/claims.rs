//! Claims-to-identity projection
//!
//! Turns a verified claim set into the subject and groups stored on the
//! request context.

use serde_json::Value;
use tracing::debug;

use crate::error::ClaimsError;

/// Decoded JWT payload
pub type ClaimSet = serde_json::Map<String, Value>;

/// Derive the subject
///
/// With no `username_claim`, `fallback` (the token's `sub`) is returned as is.
///
/// # Errors
///
/// - [`ClaimsError::UsernameClaimNotFound`] if the claim is absent
/// - [`ClaimsError::UsernameNotString`] if it is not a JSON string
pub fn subject_from_claims(
    claims: &ClaimSet,
    username_claim: Option<&str>,
    fallback: &str,
) -> Result<String, ClaimsError> {
    let Some(claim) = username_claim else {
        return Ok(fallback.to_string());
    };

    match claims.get(claim) {
        None => Err(ClaimsError::UsernameClaimNotFound),
        Some(Value::String(username)) => Ok(username.clone()),
        Some(_) => Err(ClaimsError::UsernameNotString),
    }
}

/// Derive the groups
///
/// A string becomes a single group. Arrays keep string elements verbatim and
/// render any other element as compact JSON, so `123` becomes `"123"`, `null`
/// becomes `"null"` and `{"k":"v"}` stays `{"k":"v"}`. Other JSON types yield
/// no groups.
///
/// # Errors
///
/// Returns [`ClaimsError::GroupsClaimNotFound`] if a claim is configured but
/// absent from the token.
pub fn groups_from_claims(
    claims: &ClaimSet,
    groups_claim: Option<&str>,
) -> Result<Vec<String>, ClaimsError> {
    let Some(claim) = groups_claim else {
        return Ok(Vec::new());
    };

    let value = claims.get(claim).ok_or(ClaimsError::GroupsClaimNotFound)?;

    Ok(match value {
        Value::String(group) => vec![group.clone()],
        Value::Array(items) => items.iter().map(group_name).collect(),
        other => {
            debug!(
                claim = claim,
                value = %other,
                "Groups claim is neither a string nor an array, ignoring"
            );
            Vec::new()
        }
    })
}

fn group_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
