//! `[site]` and `[build]` sections.
//!
//! # Example
//!
//! ```toml
//! [site]
//! name = "My Blog"            # Site name (required)
//! url = "https://example.com/" # Public URL, used for canonical links
//! description = ""            # Shown on the homepage
//! author = ""
//! copyright = ""
//! repo_url = "https://github.com/me/blog" # Source link shown on every page
//! repo_name = "GitHub"        # Link text, derived from the host when unset
//! favicon = "img/favicon.ico" # Relative to the docs dir
//!
//! [build]
//! docs_dir = "docs"           # Markdown sources (relative to inkpost.toml)
//! site_dir = "site"           # Generated HTML
//! theme_dir = "theme"         # Optional template overrides (*.html)
//! strict = false              # Broken links fail the build
//! n_blogs_to_show = 5         # Size of the recency index
//! excerpt_lines = 20          # Source lines used for excerpts
//! ```

use serde::Deserialize;
use std::path::PathBuf;

use super::ConfigDiagnostics;
use crate::pipeline::markdown::MarkdownOptions;

/// `[site]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site name.
    pub name: String,

    /// Public site URL (e.g., "https://example.com/blog/").
    pub url: Option<String>,

    /// Site description.
    pub description: String,

    /// Author name.
    pub author: Option<String>,

    /// Copyright notice.
    pub copyright: Option<String>,

    /// Favicon path, relative to the docs dir.
    pub favicon: Option<String>,

    /// Link to the source repository.
    pub repo_url: Option<String>,

    /// Text of the repository link.
    pub repo_name: Option<String>,
}

impl SiteSection {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.name.trim().is_empty() {
            diag.error_with_hint("site.name", "site name is empty", "set `name` under [site]");
        }
        if let Some(url) = &self.url
            && let Err(e) = url::Url::parse(url)
        {
            diag.error("site.url", format!("invalid URL `{url}`: {e}"));
        }
        match (&self.repo_url, &self.repo_name) {
            (Some(url), _) => {
                if let Err(e) = url::Url::parse(url) {
                    diag.error("site.repo_url", format!("invalid URL `{url}`: {e}"));
                }
            }
            (None, Some(_)) => diag.error_with_hint(
                "site.repo_name",
                "repo_name is set without repo_url",
                "set `repo_url` under [site]",
            ),
            (None, None) => {}
        }
    }

    /// `repo_name`, or a name derived from the host of `repo_url`:
    /// `GitHub`, `Bitbucket`, else the capitalized first host label.
    pub fn repo_name(&self) -> Option<String> {
        if let Some(name) = &self.repo_name {
            return Some(name.clone());
        }
        let url = url::Url::parse(self.repo_url.as_deref()?).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Some(match host.as_str() {
            "github.com" => "GitHub".to_string(),
            "bitbucket.org" => "Bitbucket".to_string(),
            other => {
                let label = other.split('.').next().unwrap_or(other);
                let mut chars = label.chars();
                chars
                    .next()
                    .map(|c| c.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            }
        })
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Markdown source directory.
    pub docs_dir: PathBuf,

    /// Output directory.
    pub site_dir: PathBuf,

    /// Template override directory.
    pub theme_dir: Option<PathBuf>,

    /// Treat broken links as errors.
    pub strict: bool,

    /// Empty the site dir before building (CLI only).
    #[serde(skip)]
    pub clean: bool,

    /// Enabled markdown extensions.
    pub markdown_extensions: Vec<String>,

    /// Number of entries in the recency index.
    pub n_blogs_to_show: usize,

    /// Source lines converted for each excerpt.
    pub excerpt_lines: usize,

    /// Per-directory file listing names to skip.
    pub ignore_file: String,

    /// Record store file name inside the docs dir.
    pub record_file: String,

    /// Template used when a document does not pick one.
    pub default_template: String,

    /// Scan subdirectories of the docs dir for documents.
    pub recursive: bool,

    /// Worker count override.
    pub jobs: Option<usize>,

    /// Stylesheets linked from every page. Default: all `.css` in the docs dir.
    pub extra_css: Option<Vec<String>>,

    /// Scripts linked from every page. Default: all `.js` in the docs dir.
    pub extra_javascript: Option<Vec<String>>,

    /// Render the site menu. Default: more than one page declared.
    pub include_nav: Option<bool>,

    /// Render previous/next links. Default: more than one page declared.
    pub include_next_prev: Option<bool>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            docs_dir: "docs".into(),
            site_dir: "site".into(),
            theme_dir: None,
            strict: false,
            clean: false,
            markdown_extensions: ["tables", "footnotes", "strikethrough", "tasklists"]
                .map(String::from)
                .to_vec(),
            n_blogs_to_show: 5,
            excerpt_lines: 20,
            ignore_file: ".ignore".into(),
            record_file: ".record".into(),
            default_template: "base.html".into(),
            recursive: false,
            jobs: None,
            extra_css: None,
            extra_javascript: None,
            include_nav: None,
            include_next_prev: None,
        }
    }
}

impl BuildSection {
    /// Validate after paths were resolved against the config dir.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.docs_dir.is_dir() {
            diag.error_with_hint(
                "build.docs_dir",
                format!("directory `{}` not found", self.docs_dir.display()),
                "create it or point `docs_dir` at your markdown sources",
            );
        }

        if self.site_dir.starts_with(&self.docs_dir) {
            diag.error("build.site_dir", "site_dir must not be inside docs_dir");
        } else if self.docs_dir.starts_with(&self.site_dir) {
            diag.error("build.docs_dir", "docs_dir must not be inside site_dir");
        }

        if let Some(theme) = &self.theme_dir
            && !theme.is_dir()
        {
            diag.error(
                "build.theme_dir",
                format!("directory `{}` not found", theme.display()),
            );
        }

        if self.n_blogs_to_show == 0 {
            diag.error("build.n_blogs_to_show", "must be greater than 0");
        }
        if self.jobs == Some(0) {
            diag.error("build.jobs", "must be greater than 0");
        }
        for (field, name) in [
            ("build.ignore_file", &self.ignore_file),
            ("build.record_file", &self.record_file),
            ("build.default_template", &self.default_template),
        ] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                diag.error(field, format!("`{name}` must be a plain file name"));
            }
        }

        if let Err(e) = MarkdownOptions::from_extensions(&self.markdown_extensions) {
            diag.error_with_hint(
                "build.markdown_extensions",
                e.to_string(),
                format!("known extensions: {}", MarkdownOptions::KNOWN.join(", ")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let build = BuildSection::default();
        assert_eq!(build.docs_dir, PathBuf::from("docs"));
        assert_eq!(build.site_dir, PathBuf::from("site"));
        assert_eq!(build.ignore_file, ".ignore");
        assert_eq!(build.record_file, ".record");
        assert_eq!(build.default_template, "base.html");
        assert_eq!(build.n_blogs_to_show, 5);
        assert!(!build.strict);
        assert!(build.jobs.is_none());
    }

    #[test]
    fn test_site_validate_name() {
        let mut diag = ConfigDiagnostics::new();
        SiteSection::default().validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "site.name");
    }

    #[test]
    fn test_site_validate_url() {
        let mut diag = ConfigDiagnostics::new();
        SiteSection {
            name: "Blog".into(),
            url: Some("not a url".into()),
            ..Default::default()
        }
        .validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "site.url");
    }

    #[test]
    fn test_site_validate_repo() {
        let mut diag = ConfigDiagnostics::new();
        SiteSection {
            name: "Blog".into(),
            repo_name: Some("Code".into()),
            ..Default::default()
        }
        .validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "site.repo_name");
    }

    #[test]
    fn test_repo_name_from_host() {
        let site = |url: &str| SiteSection {
            repo_url: Some(url.into()),
            ..Default::default()
        };
        assert_eq!(site("https://github.com/me/blog").repo_name().as_deref(), Some("GitHub"));
        assert_eq!(site("https://bitbucket.org/me/blog").repo_name().as_deref(), Some("Bitbucket"));
        assert_eq!(site("https://gitlab.com/me/blog").repo_name().as_deref(), Some("Gitlab"));

        let named = SiteSection {
            repo_name: Some("Sources".into()),
            ..site("https://github.com/me/blog")
        };
        assert_eq!(named.repo_name().as_deref(), Some("Sources"));
        assert_eq!(SiteSection::default().repo_name(), None);
    }

    #[test]
    fn test_build_validate_nesting() {
        let dir = tempfile::TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();

        let build = BuildSection {
            docs_dir: docs.clone(),
            site_dir: docs.join("site"),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "build.site_dir");
    }

    #[test]
    fn test_build_validate_collects_all() {
        let build = BuildSection {
            docs_dir: "/nonexistent/docs".into(),
            site_dir: "/nonexistent/site".into(),
            n_blogs_to_show: 0,
            jobs: Some(0),
            markdown_extensions: vec!["emoji".into()],
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "build.docs_dir",
                "build.n_blogs_to_show",
                "build.jobs",
                "build.markdown_extensions"
            ]
        );
    }
}
