// src/extractors/advertisement.rs

//! Advertisement feed extractor.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{AdvertisementSnapshot, Snapshot};
use crate::utils::normalize_whitespace;

use super::Extractor;

/// Keeps visible, new advertisements whose title is not excluded.
#[derive(Debug, Clone)]
pub struct AdvertisementExtractor {
    list_key: String,
    exclusions: Vec<String>,
}

impl AdvertisementExtractor {
    pub fn new(list_key: impl Into<String>, exclusions: Vec<String>) -> Self {
        Self {
            list_key: list_key.into(),
            exclusions,
        }
    }

    fn is_excluded(&self, title: &str) -> bool {
        self.exclusions
            .iter()
            .any(|needle| !needle.is_empty() && title.contains(needle.as_str()))
    }

    fn entries<'v>(&self, root: &'v Value) -> Result<&'v Vec<Value>> {
        let list = match root {
            Value::Array(_) => root,
            Value::Object(map) => map.get(&self.list_key).ok_or_else(|| {
                AppError::payload(self.page(), format!("missing key '{}'", self.list_key))
            })?,
            _ => return Err(AppError::payload(self.page(), "expected an array or object")),
        };
        list.as_array()
            .ok_or_else(|| AppError::payload(self.page(), "entries are not an array"))
    }
}

fn flag(entry: &Value, key: &str) -> bool {
    entry.get(key).and_then(Value::as_bool).unwrap_or(false)
}

impl Extractor for AdvertisementExtractor {
    fn page(&self) -> &'static str {
        "advertisement"
    }

    fn extract(&self, body: &str) -> Result<Snapshot> {
        let root: Value =
            serde_json::from_str(body).map_err(|e| AppError::payload(self.page(), e))?;

        let titles = self
            .entries(&root)?
            .iter()
            .filter(|entry| flag(entry, "visible") && flag(entry, "isNew"))
            .filter_map(|entry| entry.get("title").and_then(Value::as_str))
            .map(normalize_whitespace)
            .filter(|title| !title.is_empty() && !self.is_excluded(title))
            .collect();

        Ok(Snapshot::Advertisement(AdvertisementSnapshot { titles }))
    }

    fn empty(&self) -> Snapshot {
        Snapshot::Advertisement(AdvertisementSnapshot::default())
    }
}
