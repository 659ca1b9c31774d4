//! Tag catalog and recency index.
//!
//! Both are pure functions of the record store: rebuilding from the same
//! records always gives the same result, whatever order they arrive in.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cache::{BuildRecord, PLACEHOLDER_TAG, RecordStore};
use crate::core::path::to_site_url;

/// One document listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Source path relative to the docs dir.
    pub path: String,
    /// Absolute site URL; templates prefix it with `base_url`.
    pub url: String,
}

impl CatalogEntry {
    fn new(path: &str, record: &BuildRecord) -> Self {
        Self {
            title: record.title.clone(),
            path: path.to_string(),
            url: to_site_url(Path::new(path)),
        }
    }
}

/// Tag -> documents, tags ordered by name, entries by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    tags: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Catalog {
    pub fn from_records<'a>(records: impl IntoIterator<Item = (&'a String, &'a BuildRecord)>) -> Self {
        let mut tags: BTreeMap<String, Vec<CatalogEntry>> = BTreeMap::new();
        for (path, record) in records {
            if record.tags.is_empty() {
                tags.entry(PLACEHOLDER_TAG.to_string())
                    .or_default()
                    .push(CatalogEntry::new(path, record));
            }
            for tag in &record.tags {
                tags.entry(tag.clone())
                    .or_default()
                    .push(CatalogEntry::new(path, record));
            }
        }
        for entries in tags.values_mut() {
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            entries.dedup_by(|a, b| a.path == b.path);
        }
        Self { tags }
    }

    #[cfg(test)]
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn get(&self, tag: &str) -> Option<&[CatalogEntry]> {
        self.tags.get(tag).map(Vec::as_slice)
    }
}

/// The `n` most recent records: date descending, ties by path ascending.
pub fn recent(records: &RecordStore, n: usize) -> Vec<(&str, &BuildRecord)> {
    let mut sorted: Vec<_> = records.iter().map(|(p, r)| (p.as_str(), r)).collect();
    sorted.sort_by(|(pa, ra), (pb, rb)| rb.date.cmp(&ra.date).then_with(|| pa.cmp(pb)));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, date: &str, tags: &[&str]) -> BuildRecord {
        BuildRecord::new(title, date, tags.iter().map(|t| t.to_string()))
    }

    fn store() -> RecordStore {
        [
            ("b.md", record("B", "2024-03-01", &["rust", "web"])),
            ("a.md", record("A", "2024-03-01", &["rust"])),
            ("c.md", record("C", "1970-01-01", &[])),
            ("d.md", record("D", "2024-05-20", &["web"])),
        ]
        .into_iter()
        .map(|(p, r)| (p.to_string(), r))
        .collect()
    }

    #[test]
    fn test_catalog_groups_by_tag() {
        let catalog = Catalog::from_records(store().iter());
        assert_eq!(catalog.tags().collect::<Vec<_>>(), ["rust", "untagged", "web"]);

        let rust: Vec<_> = catalog.get("rust").unwrap().iter().map(|e| &e.path).collect();
        assert_eq!(rust, ["a.md", "b.md"]);

        let untagged = catalog.get("untagged").unwrap();
        assert_eq!(untagged[0].title, "C");
        assert_eq!(untagged[0].url, "/c.html");
    }

    #[test]
    fn test_catalog_order_independent_and_idempotent() {
        let store = store();
        let forward = Catalog::from_records(store.iter());
        let mut reversed: Vec<_> = store.iter().collect();
        reversed.reverse();
        assert_eq!(Catalog::from_records(reversed), forward);
        assert_eq!(Catalog::from_records(store.iter()), forward);
    }

    #[test]
    fn test_catalog_serializes_as_map() {
        let catalog = Catalog::from_records(store().iter());
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["web"][1]["path"], "d.md");
    }

    #[test]
    fn test_recent() {
        let store = store();
        let top: Vec<_> = recent(&store, 3).into_iter().map(|(p, _)| p).collect();
        assert_eq!(top, ["d.md", "a.md", "b.md"]);
        assert_eq!(recent(&store, 10).len(), 4);
        assert!(recent(&RecordStore::new(), 5).is_empty());
    }
}
