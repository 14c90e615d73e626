//! A permission document that is re-read only when the file changes

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;

use super::{ScopeDocument, ScopeError, ScopeSource};

/// Writes landing this close to a read may share its modification time
const RACY_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct Snapshot {
    modified: SystemTime,
    len: u64,
    read_at: SystemTime,
    document: ScopeDocument,
}

impl Snapshot {
    fn matches(&self, metadata: &std::fs::Metadata) -> bool {
        let settled = self
            .read_at
            .duration_since(self.modified)
            .map_or(false, |age| age >= RACY_WINDOW);

        settled
            && metadata.len() == self.len
            && metadata
                .modified()
                .map_or(false, |modified| modified == self.modified)
    }
}

/// A scope source that keeps the last parsed document while the file is unchanged
///
/// Every load checks the file's modification time and length. A match
/// returns the cached document; anything else re-reads and re-parses the
/// file. When the platform does not report modification times, every load
/// reads the file.
///
/// Filesystems with coarse timestamps can give a same-length rewrite the
/// same modification time as the copy already cached. A snapshot read within
/// two seconds of the file's modification time is therefore never trusted,
/// and the file keeps being re-read until it has been quiet for that long.
pub struct CachedScopeSource {
    path: PathBuf,
    snapshot: ArcSwapOption<Snapshot>,
}

impl CachedScopeSource {
    /// Constructs a new cached scope source
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// The path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forgets the cached document, forcing the next load to read the file
    pub fn invalidate(&self) {
        self.snapshot.store(None);
    }
}

impl fmt::Debug for CachedScopeSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CachedScopeSource")
            .field("path", &self.path)
            .field("cached", &self.snapshot.load().is_some())
            .finish()
    }
}

#[async_trait]
impl ScopeSource for CachedScopeSource {
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()), err)]
    async fn load_scope(&self) -> Result<ScopeDocument, ScopeError> {
        let read_at = SystemTime::now();
        let metadata = tokio::fs::metadata(&self.path).await?;

        if let Some(snapshot) = self.snapshot.load_full() {
            if snapshot.matches(&metadata) {
                tracing::trace!("permission document unchanged, using cached copy");
                return Ok(snapshot.document.clone());
            }
        }

        let data = tokio::fs::read(&self.path).await?;
        let document = ScopeDocument::from_slice(&data)?;

        match metadata.modified() {
            Ok(modified) => {
                tracing::debug!("permission document reloaded");
                self.snapshot.store(Some(Arc::new(Snapshot {
                    modified,
                    len: metadata.len(),
                    read_at,
                    document: document.clone(),
                })));
            }
            Err(_) => self.snapshot.store(None),
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, r#"{"profile": ["get"]}"#).unwrap();
        let source = CachedScopeSource::new(&path);

        let first = source.load_scope().await.unwrap();
        assert!(source.snapshot.load().is_some());
        let second = source.load_scope().await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn edits_on_disk_are_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, r#"{"profile": ["get"]}"#).unwrap();
        let source = CachedScopeSource::new(&path);

        source.load_scope().await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        std::fs::write(&path, r#"{"profile": ["get", "search"]}"#).unwrap();

        let reloaded = source.load_scope().await.unwrap();
        assert_eq!(reloaded.as_value(), &json!({"profile": ["get", "search"]}));
    }

    #[tokio::test]
    async fn same_length_rewrite_right_after_a_read_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, r#"{"profile": ["get"]}"#).unwrap();
        let source = CachedScopeSource::new(&path);

        source.load_scope().await.unwrap();
        std::fs::write(&path, r#"{"profile": ["put"]}"#).unwrap();

        let reloaded = source.load_scope().await.unwrap();
        assert_eq!(reloaded.as_value(), &json!({"profile": ["put"]}));
    }

    #[test]
    fn fresh_snapshots_are_not_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, "[]").unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        let modified = metadata.modified().unwrap();

        let snapshot = |read_at| Snapshot {
            modified,
            len: metadata.len(),
            read_at,
            document: ScopeDocument::new(json!([])),
        };

        assert!(!snapshot(modified).matches(&metadata));
        assert!(snapshot(modified + RACY_WINDOW).matches(&metadata));
    }

    #[tokio::test]
    async fn removed_file_is_unavailable_even_when_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, "[]").unwrap();
        let source = CachedScopeSource::new(&path);

        source.load_scope().await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = source.load_scope().await.unwrap_err();
        assert!(matches!(err, ScopeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_edit_is_reported_generically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, "[]").unwrap();
        let source = CachedScopeSource::new(&path);

        source.load_scope().await.unwrap();
        std::fs::write(&path, "[oops").unwrap();

        let err = source.load_scope().await.unwrap_err();
        assert!(matches!(err, ScopeError::Malformed));
    }

    #[tokio::test]
    async fn invalidate_forces_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(&path, "[]").unwrap();
        let source = CachedScopeSource::new(&path);

        source.load_scope().await.unwrap();
        source.invalidate();

        assert!(source.snapshot.load().is_none());
        assert_eq!(source.load_scope().await.unwrap().as_value(), &json!([]));
    }
}
