//! Local filesystem storage implementation.
//!
//! All snapshots live in one JSON document that is loaded once on open and
//! rewritten atomically after every save.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::{SnapshotStore, StoredSnapshot};

type Entries = BTreeMap<String, StoredSnapshot>;

/// JSON file backed snapshot store.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<Entries>,
    /// Serializes file writes so the file never goes back in time.
    writer: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let entries: Entries = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::persistence(format!("{} is not valid save data: {e}", path.display()))
                })?;
                log::info!("Loaded {} snapshot(s) from {}", entries.len(), path.display());
                entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No save data file found at {}", path.display());
                Entries::new()
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            writer: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys and save times of all stored snapshots.
    pub async fn entries(&self) -> Vec<(String, StoredSnapshot)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn flush(&self, entries: &Entries) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::persistence(format!("writing {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|stored| stored.snapshot.clone()))
    }

    async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        let _writer = self.writer.lock().await;
        let stored = StoredSnapshot::new(snapshot.clone());

        let mut next = self.entries.read().await.clone();
        next.insert(key.to_string(), stored.clone());
        self.flush(&next).await?;

        self.entries.write().await.insert(key.to_string(), stored);
        log::debug!("Wrote {} snapshot under '{}'", snapshot.kind(), key);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        let entries = self.entries.read().await.clone();
        self.flush(&entries).await?;
        log::info!("Save data flushed to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StaffMember, StaffSnapshot, VersionSnapshot};
    use tempfile::TempDir;

    fn version(v: &str) -> Snapshot {
        Snapshot::Version(VersionSnapshot {
            version: v.to_string(),
        })
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path().join("news_data.json"))
            .await
            .unwrap();

        assert!(store.load("labymod_version").await.unwrap().is_none());
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("news_data.json");

        let staff = Snapshot::Staff(StaffSnapshot {
            members: vec![StaffMember {
                id: "u1".into(),
                name: "Alice".into(),
                rank: "Jr Mod".into(),
            }],
        });

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.save("labymod_version", &version("3.9.71")).await.unwrap();
            store.save("staff_members", &staff).await.unwrap();
            store.save("labymod_version", &version("3.9.72")).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.load("labymod_version").await.unwrap(),
            Some(version("3.9.72"))
        );
        assert_eq!(reopened.load("staff_members").await.unwrap(), Some(staff));

        let keys: Vec<String> = reopened.entries().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["labymod_version", "staff_members"]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.save("labymod_version", &version("3.9.71")).await.unwrap();

        // A directory where the temp file goes makes the next write fail.
        tokio::fs::create_dir(path.with_extension("tmp")).await.unwrap();
        let err = store
            .save("labymod_version", &version("3.9.72"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        assert_eq!(
            store.load("labymod_version").await.unwrap(),
            Some(version("3.9.71"))
        );
    }

    #[tokio::test]
    async fn test_concurrent_saves_all_reach_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        let store = std::sync::Arc::new(JsonFileStore::open(&path).await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .save(&format!("key_{i}"), &version(&format!("1.{i}")))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.entries().await.len(), 8);
        assert_eq!(
            reopened.load("key_5").await.unwrap(),
            Some(version("1.5"))
        );
    }

    #[tokio::test]
    async fn test_close_writes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.close().await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
