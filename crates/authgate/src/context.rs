//! Request context carried alongside a trace batch
//!
//! Metadata is the transport's header map. The authenticator stores the
//! derived identity in typed extensions, so downstream consumers read it
//! without knowing how it was produced.

use http::{Extensions, HeaderMap};

/// Metadata key carrying credentials
pub use http::header::AUTHORIZATION;

/// Authenticated subject
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject(pub String);

/// Groups the subject belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups(pub Vec<String>);

/// Metadata plus attributes for one request
#[derive(Debug, Default)]
pub struct RequestContext {
    metadata: HeaderMap,
    extensions: Extensions,
}

impl RequestContext {
    /// Wrap incoming metadata
    pub fn new(metadata: HeaderMap) -> Self {
        Self {
            metadata,
            extensions: Extensions::new(),
        }
    }

    /// Incoming metadata
    pub fn metadata(&self) -> &HeaderMap {
        &self.metadata
    }

    /// Attributes attached while processing
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable attributes
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Subject set by authentication, if any
    pub fn subject(&self) -> Option<&str> {
        self.extensions.get::<Subject>().map(|s| s.0.as_str())
    }

    /// Groups set by authentication, if any
    pub fn groups(&self) -> Option<&[String]> {
        self.extensions.get::<Groups>().map(|g| g.0.as_slice())
    }

    /// Record the authenticated identity
    pub fn set_identity(&mut self, subject: String, groups: Vec<String>) {
        self.extensions.insert(Subject(subject));
        self.extensions.insert(Groups(groups));
    }
}

impl From<HeaderMap> for RequestContext {
    fn from(metadata: HeaderMap) -> Self {
        Self::new(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_unset_by_default() {
        let ctx = RequestContext::new(HeaderMap::new());
        assert!(ctx.subject().is_none());
        assert!(ctx.groups().is_none());
    }

    #[test]
    fn test_set_identity() {
        let mut ctx = RequestContext::default();
        ctx.set_identity("jdoe".to_string(), vec!["ops".to_string()]);

        assert_eq!(ctx.subject(), Some("jdoe"));
        assert_eq!(ctx.groups(), Some(&["ops".to_string()][..]));
        assert_eq!(
            ctx.extensions().get::<Subject>(),
            Some(&Subject("jdoe".to_string()))
        );
    }

    #[test]
    fn test_set_identity_replaces_previous() {
        let mut ctx = RequestContext::default();
        ctx.set_identity("first".to_string(), vec!["a".to_string()]);
        ctx.set_identity("second".to_string(), Vec::new());

        assert_eq!(ctx.subject(), Some("second"));
        assert_eq!(ctx.groups(), Some(&[][..]));
    }
}
