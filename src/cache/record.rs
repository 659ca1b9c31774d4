//! Record store persistence.
//!
//! Maps each built document (docs-relative path) to the metadata the
//! catalog and recency index need. Stored as JSON:
//!
//! ```json
//! {
//!   "post.md": ["My Post", "2024-06-15", ["rust", "parsing"]]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::log;

/// Tag given to documents that declare none.
pub const PLACEHOLDER_TAG: &str = "untagged";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read record store `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("record store `{0}` is corrupt")]
    Corrupt(PathBuf, #[source] serde_json::Error),
}

/// Metadata of one built document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordRepr", into = "RecordRepr")]
pub struct BuildRecord {
    pub title: String,
    /// Normalized `YYYY-MM-DD` date.
    pub date: String,
    pub tags: BTreeSet<String>,
}

type RecordRepr = (String, String, Vec<String>);

impl From<RecordRepr> for BuildRecord {
    fn from((title, date, tags): RecordRepr) -> Self {
        Self::new(title, date, tags)
    }
}

impl From<BuildRecord> for RecordRepr {
    fn from(record: BuildRecord) -> Self {
        (record.title, record.date, record.tags.into_iter().collect())
    }
}

impl BuildRecord {
    /// Empty and blank tags are dropped; no tags at all yields the placeholder.
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut tags: BTreeSet<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            tags.insert(PLACEHOLDER_TAG.to_string());
        }
        Self {
            title: title.into(),
            date: date.into(),
            tags,
        }
    }
}

/// All known records, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: BTreeMap<String, BuildRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the store. A missing file is an empty store.
    pub fn try_load(path: &Path) -> Result<Self, RecordError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(RecordError::Io(path.to_path_buf(), e)),
        };
        let store: Self = serde_json::from_str(&json)
            .map_err(|e| RecordError::Corrupt(path.to_path_buf(), e))?;
        crate::debug!("record"; "restored {} records", store.len());
        Ok(store)
    }

    /// Read the store, falling back to an empty one with a warning.
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            log!("warning"; "{e}, starting from an empty record store");
            Self::new()
        })
    }

    /// Write the store pretty-printed. Returns `false` if the file already
    /// held the same content.
    pub fn save(&self, path: &Path) -> io::Result<bool> {
        let json = serde_json::to_string_pretty(self)?;

        if fs::read_to_string(path).is_ok_and(|existing| existing == json) {
            crate::debug!("record"; "record store unchanged, skipping write");
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &json)?;
        crate::debug!("record"; "saved {} records", self.len());
        Ok(true)
    }

    /// Merge freshly built records, replacing older ones for the same path.
    pub fn merge(&mut self, updates: impl IntoIterator<Item = (String, BuildRecord)>) {
        self.records.extend(updates);
    }

    /// Drop records whose document no longer satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|path, _| keep(path));
        before - self.records.len()
    }

    #[cfg(test)]
    pub fn insert(&mut self, path: impl Into<String>, record: BuildRecord) {
        self.records.insert(path.into(), record);
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<&BuildRecord> {
        self.records.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BuildRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, BuildRecord)> for RecordStore {
    fn from_iter<I: IntoIterator<Item = (String, BuildRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
