//! ID token verification
//!
//! - [`jwks`]: one-shot fetch of the provider's JSON Web Key Set
//! - [`verifier`]: signature and registered-claim checks against that key set

pub mod jwks;
pub mod verifier;

pub use jwks::fetch_key_set;
pub use verifier::{IdTokenVerifier, NOT_BEFORE_LEEWAY, VerifiedToken};
