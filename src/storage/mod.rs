//! Storage abstractions for snapshot persistence.
//!
//! Each checker owns one key. The store keeps the last snapshot saved under
//! that key so the next run has something to diff against.
//!
//! ## File Layout
//!
//! ```text
//! news_data.json
//! {
//!   "labymod_version": { "saved_at": "...", "snapshot": { "kind": "version", ... } },
//!   "staff_members":   { "saved_at": "...", "snapshot": { "kind": "staff", ... } }
//! }
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::JsonFileStore;
pub use memory::MemoryStore;

/// A snapshot together with the time it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub saved_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

impl StoredSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            saved_at: Utc::now(),
            snapshot,
        }
    }
}

/// Key-value persistence of the last known snapshot per checker.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot saved under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Snapshot>>;

    /// Replace the snapshot saved under `key`.
    async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()>;

    /// Flush pending state before shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
