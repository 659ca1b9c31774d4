//! Source path to output path/URL mapping.
//!
//! Pure functions: nothing here touches the filesystem.
//!
//! | Source             | Output path        | Site URL            |
//! |--------------------|--------------------|---------------------|
//! | `index.md`         | `index.html`       | `/index.html`       |
//! | `about.md`         | `about.html`       | `/about.html`       |
//! | `api-guide/core.md`| `api-guide/core.html` | `/api-guide/core.html` |

use std::path::{Component, Path, PathBuf};

use super::kind::is_markup_file;

/// Extension of every rendered document.
pub const OUTPUT_EXTENSION: &str = "html";

/// Map a source path to its output path.
///
/// Paths without a markup extension are returned unchanged, which makes the
/// mapping idempotent on already-converted paths.
pub fn to_output_path(src: &Path) -> PathBuf {
    if is_markup_file(src) {
        src.with_extension(OUTPUT_EXTENSION)
    } else {
        src.to_path_buf()
    }
}

/// Map a source path to its absolute site URL (`/a/b.html`).
///
/// Always uses forward slashes, whatever the host separator is.
pub fn to_site_url(src: &Path) -> String {
    format!("/{}", to_posix(&to_output_path(src)))
}

/// Render a relative path with `/` separators, dropping `.` and root parts.
pub fn to_posix(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::Normal(s) => s.to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

/// Check whether a source path is the site homepage.
///
/// The path with its extension removed must be exactly `index`, so a nested
/// `sub/index.md` is not a homepage.
pub fn is_homepage(path: &Path) -> bool {
    path.with_extension("") == Path::new("index")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_output_path() {
        assert_eq!(to_output_path(Path::new("a/b.md")), PathBuf::from("a/b.html"));
        assert_eq!(to_output_path(Path::new("index.markdown")), PathBuf::from("index.html"));
        assert_eq!(to_output_path(Path::new("x.y.md")), PathBuf::from("x.y.html"));
    }

    #[test]
    fn test_to_output_path_idempotent() {
        for src in ["a/b.md", "index.md", "deep/er/c.mkd", "img/x.png"] {
            let once = to_output_path(Path::new(src));
            let twice = to_output_path(&once);
            assert_eq!(once, twice, "{src}");
            assert_eq!(once, to_output_path(Path::new(src)));
        }
    }

    #[test]
    fn test_to_site_url() {
        assert_eq!(to_site_url(Path::new("index.md")), "/index.html");
        assert_eq!(to_site_url(Path::new("api-guide/core.md")), "/api-guide/core.html");
        assert_eq!(to_site_url(Path::new("./about.md")), "/about.html");
    }

    #[test]
    fn test_to_posix() {
        assert_eq!(to_posix(Path::new("a/./b/c.md")), "a/b/c.md");
        assert_eq!(to_posix(Path::new("../x")), "../x");
        assert_eq!(to_posix(Path::new("")), "");
    }

    #[test]
    fn test_is_homepage() {
        assert!(is_homepage(Path::new("index.md")));
        assert!(is_homepage(Path::new("index.markdown")));
        assert!(!is_homepage(Path::new("sub/index.md")));
        assert!(!is_homepage(Path::new("indexes.md")));
        assert!(!is_homepage(Path::new("about.md")));
    }
}
