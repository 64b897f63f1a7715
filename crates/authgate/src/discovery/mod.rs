//! OpenID Connect Discovery
//!
//! Fetches `/.well-known/openid-configuration` for the configured issuer and
//! checks that the provider claims the same issuer identifier.

mod fetcher;
mod types;

pub(crate) use fetcher::get_json;
pub use fetcher::{MAX_RESPONSE_SIZE, discovery_url, fetch_provider_metadata};
pub use types::ProviderMetadata;
