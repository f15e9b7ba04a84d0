// src/extractors/version.rs

//! Launcher version extractor.
//!
//! Reads the version feed directly instead of parsing the download page.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Snapshot, VersionSnapshot};

use super::Extractor;

/// Looks up the version string at a fixed key path.
#[derive(Debug, Clone)]
pub struct VersionExtractor {
    path: Vec<String>,
}

impl VersionExtractor {
    pub fn new(path: Vec<String>) -> Self {
        Self { path }
    }
}

impl Extractor for VersionExtractor {
    fn page(&self) -> &'static str {
        "version"
    }

    fn extract(&self, body: &str) -> Result<Snapshot> {
        let root: Value =
            serde_json::from_str(body).map_err(|e| AppError::payload(self.page(), e))?;

        let mut node = &root;
        for key in &self.path {
            node = node
                .get(key)
                .ok_or_else(|| AppError::payload(self.page(), format!("missing key '{key}'")))?;
        }

        let version = node
            .as_str()
            .ok_or_else(|| AppError::payload(self.page(), "version is not a string"))?;

        Ok(Snapshot::Version(VersionSnapshot {
            version: version.trim().to_string(),
        }))
    }

    fn empty(&self) -> Snapshot {
        Snapshot::Version(VersionSnapshot {
            version: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> VersionExtractor {
        VersionExtractor::new(vec!["1.8.9".into(), "version".into()])
    }

    #[test]
    fn test_reads_version_at_path() {
        let body = r#"{"1.8.9": {"version": "3.9.71", "hash": "abc"}, "1.12.2": {"version": "1.0"}}"#;
        assert_eq!(
            extractor().extract(body).unwrap(),
            Snapshot::Version(VersionSnapshot {
                version: "3.9.71".into()
            })
        );
    }

    #[test]
    fn test_missing_key_is_payload_error() {
        let err = extractor().extract(r#"{"1.12.2": {"version": "1.0"}}"#).unwrap_err();
        assert!(matches!(err, AppError::Payload { .. }));
    }

    #[test]
    fn test_non_string_version_is_payload_error() {
        let err = extractor().extract(r#"{"1.8.9": {"version": 3}}"#).unwrap_err();
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_invalid_json_is_payload_error() {
        assert!(extractor().extract("<html>").unwrap_err().is_fetch_failure());
    }
}
