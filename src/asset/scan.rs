//! Asset scanning functions (pure, no side effects).

use jwalk::WalkDir;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::core::{FileKind, is_markup_file, is_rendered_file, path::to_posix};

use super::MediaRoute;

/// Walk `dir` and return visible files (relative to `dir`, sorted) matching
/// `keep`.
pub fn collect_files<P>(dir: &Path, keep: P) -> Vec<PathBuf>
where
    P: Fn(&Path) -> bool,
{
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .filter(|rel| keep(rel))
        .collect()
}

/// Media files to copy: everything in the docs dir except markup, hidden
/// entries and the ignore/record files. Theme files other than templates
/// are included too; docs files win on conflicts.
pub fn scan_media(config: &SiteConfig) -> Vec<MediaRoute> {
    let build = &config.build;
    let special = |rel: &Path| {
        rel.file_name()
            .is_some_and(|n| n == build.ignore_file.as_str() || n == build.record_file.as_str())
    };

    let docs = collect_files(&build.docs_dir, |rel| !is_markup_file(rel) && !special(rel));
    let mut routes: Vec<MediaRoute> = docs
        .iter()
        .map(|rel| MediaRoute::new(&build.docs_dir, rel, &build.site_dir))
        .collect();

    if let Some(theme_dir) = &build.theme_dir {
        let theme = collect_files(theme_dir, |rel| {
            !is_rendered_file(rel) && !docs.iter().any(|d| d == rel)
        });
        routes.extend(
            theme
                .iter()
                .map(|rel| MediaRoute::new(theme_dir, rel, &build.site_dir)),
        );
    }
    routes
}

/// Site URLs of every file of `kind` in the docs dir (`/css/site.css`).
pub fn find_by_kind(docs_dir: &Path, kind: FileKind) -> Vec<String> {
    collect_files(docs_dir, |rel| FileKind::from_path(rel) == kind)
        .iter()
        .map(|rel| format!("/{}", to_posix(rel)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_scan_media_skips_markup_hidden_and_special() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        for name in [
            "index.md",
            "img/x.png",
            "css/site.css",
            ".ignore",
            ".record",
            ".git/config",
            "sub/post.markdown",
            "files/report.pdf",
        ] {
            write(&docs.join(name));
        }
        let config = test_config(dir.path(), "");

        let sources: Vec<_> = scan_media(&config)
            .into_iter()
            .map(|r| r.rel)
            .collect();
        assert_eq!(
            sources,
            [
                PathBuf::from("css/site.css"),
                PathBuf::from("files/report.pdf"),
                PathBuf::from("img/x.png"),
            ]
        );
    }

    #[test]
    fn test_theme_media_yields_to_docs() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("docs/style.css"));
        write(&dir.path().join("theme/style.css"));
        write(&dir.path().join("theme/logo.svg"));
        write(&dir.path().join("theme/base.html"));
        let config = test_config(dir.path(), "[build]\ntheme_dir = \"theme\"");

        let routes = scan_media(&config);
        assert_eq!(routes.len(), 2);
        assert!(routes[0].source.starts_with(&config.build.docs_dir));
        assert_eq!(routes[1].rel, PathBuf::from("logo.svg"));
    }

    #[test]
    fn test_find_by_kind() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        write(&docs.join("b.css"));
        write(&docs.join("css/a.css"));
        write(&docs.join("app.js"));

        assert_eq!(find_by_kind(&docs, FileKind::Style), ["/b.css", "/css/a.css"]);
        assert_eq!(find_by_kind(&docs, FileKind::Script), ["/app.js"]);
        assert!(find_by_kind(&dir.path().join("missing"), FileKind::Style).is_empty());
    }
}
