//! In-memory snapshot store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// Non-durable store, used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}
