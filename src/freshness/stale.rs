//! Stale document detection.
//!
//! Each source directory is listed once. Entries are skipped when they are
//! hidden, the ignore file itself, named in it, declared pages, or
//! directories (unless recursive scanning is on). Markup sources are then matched by stem against
//! the `.html` files in the matching output directory.

use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::ignore::IgnoreList;
use super::mtime::{get_mtime, is_output_fresh};
use crate::config::SiteConfig;
use crate::core::is_markup_file;
use crate::core::path::OUTPUT_EXTENSION;
use crate::nav::NavGraph;
use crate::utils::path::is_hidden;

/// Result of one scan. Paths are relative to the docs directory, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaleScan {
    pub stale: Vec<PathBuf>,
    pub fresh: Vec<PathBuf>,
}

/// Finds documents whose output is missing or older than their source.
#[derive(Debug, Clone)]
pub struct StalenessDetector<'a> {
    docs_dir: &'a Path,
    site_dir: &'a Path,
    ignore_file: &'a str,
    recursive: bool,
    nav: &'a NavGraph,
}

impl<'a> StalenessDetector<'a> {
    pub fn new(config: &'a SiteConfig, nav: &'a NavGraph) -> Self {
        Self {
            docs_dir: &config.build.docs_dir,
            site_dir: &config.build.site_dir,
            ignore_file: &config.build.ignore_file,
            recursive: config.build.recursive,
            nav,
        }
    }

    pub fn scan(&self) -> io::Result<StaleScan> {
        let mut scan = StaleScan::default();
        self.scan_dir(Path::new(""), &mut scan)?;
        scan.stale.sort();
        scan.fresh.sort();
        Ok(scan)
    }

    fn scan_dir(&self, rel_dir: &Path, scan: &mut StaleScan) -> io::Result<()> {
        let dir = self.docs_dir.join(rel_dir);
        let ignored = IgnoreList::load(&dir.join(self.ignore_file))?;
        let outputs = list_outputs(&self.site_dir.join(rel_dir));

        let mut entries: Vec<_> = fs::read_dir(&dir)?.flatten().collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name == self.ignore_file || ignored.contains(name) {
                continue;
            }

            let rel = rel_dir.join(name);
            if is_hidden(&rel) || self.nav.is_declared(&rel) {
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if self.recursive {
                    self.scan_dir(&rel, scan)?;
                }
                continue;
            }
            if !is_markup_file(&rel) {
                continue;
            }

            let stem = rel
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let source = entry.metadata().and_then(|m| m.modified()).ok();
            let fresh = outputs
                .get(&stem)
                .is_some_and(|output| is_output_fresh(*output, source));

            if fresh {
                scan.fresh.push(rel);
            } else {
                scan.stale.push(rel);
            }
        }
        Ok(())
    }
}

/// `.html` files of one output directory: stem -> mtime.
fn list_outputs(dir: &Path) -> FxHashMap<String, Option<SystemTime>> {
    let Ok(entries) = fs::read_dir(dir) else {
        return FxHashMap::default();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == OUTPUT_EXTENSION))
        .filter_map(|p| {
            let stem = p.file_stem()?.to_string_lossy().into_owned();
            Some((stem, get_mtime(&p)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::nav::PageDecl;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 + secs);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn setup(extra: &str) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::create_dir_all(dir.path().join("site")).unwrap();
        let config = test_config(dir.path(), extra);
        (dir, config)
    }

    fn scan(config: &SiteConfig, pages: &[PageDecl]) -> StaleScan {
        let nav = NavGraph::build(pages).unwrap();
        StalenessDetector::new(config, &nav).scan().unwrap()
    }

    #[test]
    fn test_missing_output_is_stale() {
        let (dir, config) = setup("");
        touch(&dir.path().join("docs/post.md"), 10);

        let result = scan(&config, &[]);
        assert_eq!(result.stale, [PathBuf::from("post.md")]);
        assert!(result.fresh.is_empty());
    }

    #[test]
    fn test_mtime_comparison() {
        let (dir, config) = setup("");
        touch(&dir.path().join("docs/newer.md"), 10);
        touch(&dir.path().join("site/newer.html"), 20);
        touch(&dir.path().join("docs/equal.md"), 10);
        touch(&dir.path().join("site/equal.html"), 10);
        touch(&dir.path().join("docs/older.md"), 30);
        touch(&dir.path().join("site/older.html"), 20);

        let result = scan(&config, &[]);
        assert_eq!(result.stale, [PathBuf::from("older.md")]);
        assert_eq!(
            result.fresh,
            [PathBuf::from("equal.md"), PathBuf::from("newer.md")]
        );
    }

    #[test]
    fn test_skips_ignored_declared_and_non_markup() {
        let (dir, config) = setup("");
        let docs = dir.path().join("docs");
        touch(&docs.join("index.md"), 0);
        touch(&docs.join("draft.md"), 0);
        touch(&docs.join("post.md"), 0);
        touch(&docs.join("img/x.png"), 0);
        touch(&docs.join("sub/nested.md"), 0);
        fs::write(docs.join(".ignore"), "draft.md\n").unwrap();

        let result = scan(&config, &[PageDecl::new("index.md")]);
        assert_eq!(result.stale, [PathBuf::from("post.md")]);
    }

    #[test]
    fn test_recursive_uses_per_directory_ignore() {
        let (dir, config) = setup("[build]\nrecursive = true");
        let docs = dir.path().join("docs");
        touch(&docs.join("top.md"), 0);
        touch(&docs.join("sub/a.md"), 0);
        touch(&docs.join("sub/b.md"), 0);
        touch(&dir.path().join("site/sub/a.html"), 5);
        fs::write(docs.join("sub/.ignore"), "# drafts\nb.md\n").unwrap();

        let result = scan(&config, &[]);
        assert_eq!(result.stale, [PathBuf::from("top.md")]);
        assert_eq!(result.fresh, [PathBuf::from("sub/a.md")]);
    }

    #[test]
    fn test_recursive_skips_hidden_entries() {
        let (dir, config) = setup("[build]\nrecursive = true");
        let docs = dir.path().join("docs");
        touch(&docs.join("post.md"), 0);
        touch(&docs.join(".draft.md"), 0);
        touch(&docs.join(".git/notes.md"), 0);
        touch(&docs.join("sub/.cache/old.md"), 0);

        let result = scan(&config, &[]);
        assert_eq!(result.stale, [PathBuf::from("post.md")]);
        assert!(result.fresh.is_empty());
    }
}
