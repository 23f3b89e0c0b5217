//! Local filesystem storage implementation.
//!
//! Writes are atomic: data goes to a temp file that is then renamed over the
//! target.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ContentSnapshot, SourceKey};
use crate::monitor::ContentMonitor;
use crate::storage::MonitorStorage;
use crate::utils::is_safe_segment;

const MONITORS_KEY: &str = "monitors.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Snapshot key for a source.
    fn snapshot_key(key: &SourceKey) -> Result<String> {
        if !is_safe_segment(&key.code) || !is_safe_segment(&key.name) {
            return Err(AppError::validation(format!(
                "Source {key} cannot be stored as a path"
            )));
        }
        Ok(format!(
            "snapshots/{}/{}/{}.json",
            key.code, key.content_type, key.name
        ))
    }
}

#[async_trait]
impl MonitorStorage for LocalStorage {
    async fn load_monitors(&self) -> Result<Vec<ContentMonitor>> {
        match self.read_json(MONITORS_KEY).await? {
            Some(monitors) => Ok(monitors),
            None => {
                log::warn!("No {} found in {}", MONITORS_KEY, self.root_dir.display());
                Ok(Vec::new())
            }
        }
    }

    async fn save_monitors(&self, monitors: &[ContentMonitor]) -> Result<()> {
        self.write_json(MONITORS_KEY, monitors).await?;
        log::debug!("Saved {} monitors", monitors.len());
        Ok(())
    }

    async fn load_snapshot(&self, key: &SourceKey) -> Result<Option<ContentSnapshot>> {
        self.read_json(&Self::snapshot_key(key)?).await
    }

    async fn write_snapshot(&self, key: &SourceKey, snapshot: &ContentSnapshot) -> Result<()> {
        let path = Self::snapshot_key(key)?;
        self.write_json(&path, snapshot).await?;
        log::debug!("Snapshot for {}: {} items written to {}", key, snapshot.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, ContentType};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
        assert!(storage.load_monitors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_monitors_persist() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let mut video = ContentMonitor::new_video("acme", "main", "UC1");
        video.subscribe(ContentItem::new("v1", "One")).unwrap();
        let monitors = vec![ContentMonitor::new_publication("acme", "press"), video];

        storage.save_monitors(&monitors).await.unwrap();
        let loaded = storage.load_monitors().await.unwrap();

        assert_eq!(loaded, monitors);
        assert_eq!(loaded[1].subscribed().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_persist() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = SourceKey::new("acme", ContentType::Publication, "press");

        assert!(storage.load_snapshot(&key).await.unwrap().is_none());

        let snapshot = ContentSnapshot::new(
            ContentType::Publication,
            vec![ContentItem::new("1", "First").with_published(10)],
        );
        storage.write_snapshot(&key, &snapshot).await.unwrap();

        assert!(tmp.path().join("snapshots/acme/publication/press.json").exists());
        let loaded = storage.load_snapshot(&key).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_snapshot_key_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = SourceKey::new("..", ContentType::Video, "main");

        assert!(storage.load_snapshot(&key).await.is_err());
    }
}
