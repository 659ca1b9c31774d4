//! Filesystem path helpers.
//!
//! - `normalize_path` - absolute form of a path (canonicalize + fallback)
//! - `resolve_path` - config-relative paths with `~` expansion
//! - `is_hidden` - dot-file check used by scans and `--clean`
//! - `clear_dir` - empty a directory while keeping hidden entries

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against the directory holding the config file.
///
/// `~` is expanded first; absolute results are kept as-is.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

/// True if the final component starts with a dot.
#[inline]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Remove every non-hidden entry of `dir`. Returns the number removed.
///
/// A missing directory counts as already empty.
pub fn clear_dir(dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        if is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Whether `dir` holds anything besides hidden entries.
pub fn has_visible_entries(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|e| !is_hidden(&e.path()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/site");
        assert_eq!(resolve_path(Path::new("docs"), base), PathBuf::from("/site/docs"));
        assert_eq!(resolve_path(Path::new("/abs/out"), base), PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_resolve_path_tilde() {
        let resolved = resolve_path(Path::new("~/blog"), Path::new("/site"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("blog"));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".git")));
        assert!(is_hidden(Path::new("docs/.record")));
        assert!(!is_hidden(Path::new("docs/a.md")));
    }

    #[test]
    fn test_clear_dir_keeps_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.html"), "").unwrap();
        fs::write(dir.path().join("a.html"), "").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".nojekyll"), "").unwrap();

        assert!(has_visible_entries(dir.path()));
        assert_eq!(clear_dir(dir.path()).unwrap(), 2);
        assert!(!has_visible_entries(dir.path()));
        assert!(dir.path().join(".git").is_dir());
        assert!(dir.path().join(".nojekyll").is_file());
    }

    #[test]
    fn test_clear_dir_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clear_dir(&dir.path().join("nope")).unwrap(), 0);
    }
}
