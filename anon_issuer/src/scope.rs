//! Permission documents granted to the anonymous identity

use std::{error, io};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cache;
pub mod file;

pub use cache::CachedScopeSource;
pub use file::FileScopeSource;

/// The permission set granted to anonymous callers
///
/// The document is forwarded to the authority untouched; its structure is
/// never interpreted here.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ScopeDocument(serde_json::Value);

impl ScopeDocument {
    /// Wraps an already parsed document
    #[inline]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Parses a document from raw bytes
    ///
    /// Parser detail is logged and replaced by [`ScopeError::Malformed`], so
    /// that it never reaches a caller.
    pub fn from_slice(data: &[u8]) -> Result<Self, ScopeError> {
        serde_json::from_slice(data).map(Self).map_err(|error| {
            tracing::debug!(
                error = (&error as &dyn error::Error),
                "permission document is not valid JSON"
            );
            ScopeError::Malformed
        })
    }

    /// The parsed document
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// An error obtaining the permission document
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The document could not be read
    #[error(transparent)]
    Unavailable(#[from] io::Error),
    /// The document was read but is not valid structured data
    #[error("failed to load role permissions")]
    Malformed,
}

/// A source for the anonymous permission document
#[async_trait]
pub trait ScopeSource: Send + Sync {
    /// Produces the current permission document
    async fn load_scope(&self) -> Result<ScopeDocument, ScopeError>;
}

#[async_trait]
impl<T: ScopeSource + ?Sized> ScopeSource for Box<T> {
    async fn load_scope(&self) -> Result<ScopeDocument, ScopeError> {
        (**self).load_scope().await
    }
}

#[async_trait]
impl<T: ScopeSource + ?Sized> ScopeSource for std::sync::Arc<T> {
    async fn load_scope(&self) -> Result<ScopeDocument, ScopeError> {
        (**self).load_scope().await
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn malformed_documents_log_parser_detail() {
        let err = ScopeDocument::from_slice(b"{\"users\": ").unwrap_err();

        assert_eq!(err.to_string(), "failed to load role permissions");
        assert!(logs_contain("permission document is not valid JSON"));
        assert!(logs_contain("EOF while parsing"));
    }

    #[test]
    fn malformed_documents_hide_parser_detail() {
        let err = ScopeDocument::from_slice(b"{\"users\": [get]}").unwrap_err();

        assert!(matches!(err, ScopeError::Malformed));
        assert_eq!(err.to_string(), "failed to load role permissions");
        assert!(error::Error::source(&err).is_none());
    }

    #[test]
    fn any_json_value_is_accepted() {
        let doc = ScopeDocument::from_slice(b"[{\"service\": \"profile\", \"methods\": {\"get\": true}}]")
            .unwrap();

        assert!(doc.as_value().is_array());
    }
}
