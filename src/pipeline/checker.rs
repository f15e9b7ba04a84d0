// src/pipeline/checker.rs

//! Checkers: fetch a source, extract a snapshot, diff it and persist it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::extractors::Extractor;
use crate::models::ChangeEvent;
use crate::pipeline::diff::diff;
use crate::storage::SnapshotStore;
use crate::utils::http::Fetch;

/// A periodically polled source.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Persistence key, unique per scheduler.
    fn key(&self) -> &str;

    /// Run every this many ticks.
    fn interval_ticks(&self) -> u32;

    /// Hold announcements back for this many ticks.
    fn announce_delay_ticks(&self) -> u32 {
        0
    }

    /// Poll the source once and return what changed since the last run.
    async fn run_once(&self, store: &dyn SnapshotStore) -> Result<Vec<ChangeEvent>>;
}

/// Checker for one URL, parameterised by the extractor that reads it.
pub struct PageChecker<E: Extractor> {
    key: String,
    url: String,
    interval_ticks: u32,
    announce_delay_ticks: u32,
    extractor: E,
    fetcher: Arc<dyn Fetch>,
}

impl<E: Extractor> PageChecker<E> {
    pub fn new(
        key: impl Into<String>,
        url: impl Into<String>,
        extractor: E,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            interval_ticks: 1,
            announce_delay_ticks: 0,
            extractor,
            fetcher,
        }
    }

    pub fn with_interval(mut self, ticks: u32) -> Self {
        self.interval_ticks = ticks;
        self
    }

    pub fn with_delay(mut self, ticks: u32) -> Self {
        self.announce_delay_ticks = ticks;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<E: Extractor> Checker for PageChecker<E> {
    fn key(&self) -> &str {
        &self.key
    }

    fn interval_ticks(&self) -> u32 {
        self.interval_ticks
    }

    fn announce_delay_ticks(&self) -> u32 {
        self.announce_delay_ticks
    }

    async fn run_once(&self, store: &dyn SnapshotStore) -> Result<Vec<ChangeEvent>> {
        let body = self.fetcher.fetch_text(&self.url).await?;

        let snapshot = match self.extractor.extract(&body) {
            Ok(snapshot) => snapshot,
            Err(e @ AppError::MalformedDocument { .. }) => {
                log::warn!("[{}] {}, using empty snapshot", self.key, e);
                self.extractor.empty()
            }
            Err(e) => return Err(e),
        };

        let previous = store.load(&self.key).await?;
        let events = diff(previous.as_ref(), &snapshot);

        if let Err(e) = store.save(&self.key, &snapshot).await {
            log::error!("[{}] Failed to save snapshot: {}", self.key, e);
        }

        log::debug!(
            "[{}] {} snapshot with {} entries, {} change(s)",
            self.key,
            self.extractor.page(),
            snapshot.len(),
            events.len()
        );
        Ok(events)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::extractors::{StaffExtractor, VersionExtractor};
    use crate::models::{Entity, Snapshot, VersionSnapshot};
    use crate::storage::MemoryStore;
    use std::sync::Mutex;

    /// Fetcher returning queued bodies in order; `None` is a fetch failure.
    #[derive(Default)]
    pub(crate) struct ScriptedFetcher {
        bodies: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn new(bodies: Vec<Option<&str>>) -> Self {
            let mut bodies: Vec<Option<String>> =
                bodies.into_iter().map(|b| b.map(str::to_string)).collect();
            bodies.reverse();
            Self {
                bodies: Mutex::new(bodies),
            }
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            match self.bodies.lock().unwrap().pop().flatten() {
                Some(body) => Ok(body),
                None => Err(AppError::fetch(url, "connection refused")),
            }
        }
    }

    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl SnapshotStore for ReadOnlyStore {
        async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
            self.0.load(key).await
        }

        async fn save(&self, _key: &str, _snapshot: &Snapshot) -> Result<()> {
            Err(AppError::persistence("read-only"))
        }
    }

    fn version_checker(bodies: Vec<Option<&str>>) -> PageChecker<VersionExtractor> {
        PageChecker::new(
            "labymod_version",
            "https://dl.labymod.net/versions.json",
            VersionExtractor::new(vec!["1.8.9".into(), "version".into()]),
            Arc::new(ScriptedFetcher::new(bodies)),
        )
        .with_interval(5)
        .with_delay(30)
    }

    fn version_body(v: &str) -> String {
        format!(r#"{{"1.8.9": {{"version": "{v}"}}}}"#)
    }

    #[tokio::test]
    async fn test_bootstrap_then_change() {
        let first = version_body("3.9.71");
        let second = version_body("3.9.72");
        let checker = version_checker(vec![Some(&first), Some(&first), Some(&second)]);
        let store = MemoryStore::new();

        assert!(checker.run_once(&store).await.unwrap().is_empty());
        assert!(checker.run_once(&store).await.unwrap().is_empty());
        assert_eq!(
            checker.run_once(&store).await.unwrap(),
            vec![ChangeEvent::Added(Entity::Version("3.9.72".into()))]
        );
        assert_eq!(checker.interval_ticks(), 5);
        assert_eq!(checker.announce_delay_ticks(), 30);
    }

    #[tokio::test]
    async fn test_fetch_failure_persists_nothing() {
        let checker = version_checker(vec![None]);
        let store = MemoryStore::new();

        let err = checker.run_once(&store).await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(store.load("labymod_version").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payload_error_persists_nothing() {
        let checker = version_checker(vec![Some(r#"{"1.8.9": {}}"#)]);
        let store = MemoryStore::new();

        assert!(checker.run_once(&store).await.is_err());
        assert!(store.load("labymod_version").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_saves_empty_snapshot() {
        let checker = PageChecker::new(
            "staff_members",
            "https://www.labymod.net/en/team/labymod",
            StaffExtractor::default(),
            Arc::new(ScriptedFetcher::new(vec![Some("<html><body></body></html>")])),
        );
        let store = MemoryStore::new();

        assert!(checker.run_once(&store).await.unwrap().is_empty());
        let saved = store.load("staff_members").await.unwrap().unwrap();
        assert_eq!(saved.kind(), "staff");
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_still_returns_events() {
        let inner = MemoryStore::new();
        inner
            .save(
                "labymod_version",
                &Snapshot::Version(VersionSnapshot {
                    version: "3.9.71".into(),
                }),
            )
            .await
            .unwrap();
        let store = ReadOnlyStore(inner);

        let body = version_body("3.9.72");
        let checker = version_checker(vec![Some(&body)]);
        let events = checker.run_once(&store).await.unwrap();
        assert_eq!(events.len(), 1);
    }
}
