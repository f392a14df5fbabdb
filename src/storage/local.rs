//! Local filesystem snapshot store.
//!
//! Stores the two keys as files under a root directory. Writes go to a
//! temporary file first and are renamed into place, so a reader never
//! observes a partially written snapshot.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::models::MenuSnapshot;
use crate::storage::{SnapshotStore, KEY_LAST_UPDATED, KEY_LATEST_MENU};

/// Filesystem-backed snapshot store.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{key}.json"))
    }

    /// Ensure the root directory exists.
    async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root_dir).await?;
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.ensure_dir().await?;
        let path = self.path(key);

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the key was never written.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStore {
    async fn put(&self, snapshot: &MenuSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(KEY_LATEST_MENU, &bytes).await?;

        let stamp = serde_json::to_vec(&snapshot.fetched_at)?;
        self.write_bytes(KEY_LAST_UPDATED, &stamp).await?;
        Ok(())
    }

    async fn get(&self) -> Result<Option<MenuSnapshot>, StoreError> {
        match self.read_bytes(KEY_LATEST_MENU).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn last_updated(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        match self.read_bytes(KEY_LAST_UPDATED).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuOrigin, MenuPayload};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_snapshot(fetched_at: DateTime<Utc>) -> MenuSnapshot {
        let payload: MenuPayload = serde_json::from_str(
            r#"{
                "menuA": {"name": "豚肉の生姜焼き弁当", "price": "550"},
                "menuB": {"name": "鶏の唐揚げ弁当", "price": "600"},
                "menuC": {"name": "鯖の塩焼き弁当", "price": "650"}
            }"#,
        )
        .unwrap();
        payload.to_snapshot(fetched_at, fetched_at, MenuOrigin::RemoteStructured, None)
    }

    #[tokio::test]
    async fn empty_store_reads_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        assert!(store.get().await.unwrap().is_none());
        assert!(store.last_updated().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap();

        let snapshot = sample_snapshot(at);
        store.put(&snapshot).await.unwrap();

        let loaded = store.get().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(store.last_updated().await.unwrap(), Some(at));
    }

    #[tokio::test]
    async fn put_replaces_unconditionally() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let first = sample_snapshot(Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap());
        let second = sample_snapshot(Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();

        let loaded = store.get().await.unwrap().unwrap();
        assert_eq!(loaded.fetched_at, second.fetched_at);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap();

        LocalStore::new(tmp.path())
            .put(&sample_snapshot(at))
            .await
            .unwrap();

        // A fresh handle over the same directory sees the data.
        let reopened = LocalStore::new(tmp.path());
        assert!(reopened.get().await.unwrap().is_some());
    }
}
