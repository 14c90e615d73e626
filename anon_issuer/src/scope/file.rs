//! A permission document read from the local filesystem

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ScopeDocument, ScopeError, ScopeSource};

/// The path used when none is configured
pub const DEFAULT_PERMISSION_PATH: &str = "./permissions.json";

/// A scope source that reads and parses a file on every request
///
/// Edits on disk are visible to the very next request.
#[derive(Clone, Debug)]
pub struct FileScopeSource {
    path: PathBuf,
}

impl FileScopeSource {
    /// Constructs a new file scope source
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileScopeSource {
    fn default() -> Self {
        Self::new(DEFAULT_PERMISSION_PATH)
    }
}

#[async_trait]
impl ScopeSource for FileScopeSource {
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()), err)]
    async fn load_scope(&self) -> Result<ScopeDocument, ScopeError> {
        let data = tokio::fs::read(&self.path).await?;
        ScopeDocument::from_slice(&data)
    }
}
