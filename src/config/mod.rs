//! Site configuration management for `inkpost.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # [site] and [build]
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── util       # config file discovery
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `pages`   | Ordered page declarations (navigation)           |
//! | `[site]`  | Site metadata (name, url, description, favicon)  |
//! | `[build]` | Paths, strictness, workers, index sizes          |

mod error;
mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{BuildSection, SiteSection};

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    cli::{BuildArgs, Cli},
    log,
    nav::{NavError, NavGraph, PageDecl},
    pipeline::markdown::MarkdownOptions,
    utils::path::{normalize_path, resolve_path},
};
use util::find_config_file;

/// Root configuration structure representing inkpost.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Ordered page declarations.
    pub pages: Vec<PageDecl>,

    /// Site metadata
    pub site: SiteSection,

    /// Build settings
    pub build: BuildSection,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; the project root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;
        let config_path = find_config_file(&cli.config, &cwd)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.finalize(&root);

        if let crate::cli::Commands::Build { build_args } = &cli.command {
            config.apply_build_args(build_args);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Resolve configured directories against `root`.
    pub fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.docs_dir = normalize_path(&resolve_path(&self.build.docs_dir, &root));
        self.build.site_dir = normalize_path(&resolve_path(&self.build.site_dir, &root));
        self.build.theme_dir = self
            .build
            .theme_dir
            .take()
            .map(|dir| normalize_path(&resolve_path(&dir, &root)));
        self.root = root;
    }

    /// CLI flags override the config file.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        self.build.clean = args.clean;
        self.build.strict |= args.strict;
        if let Some(jobs) = args.jobs {
            self.build.jobs = Some(usize::from(jobs));
        }
    }

    /// Validate all sections and the page list, reporting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.site.validate(&mut diag);
        self.build.validate(&mut diag);
        diag.into_result()?;

        self.nav()?;
        Ok(())
    }

    /// Build the navigation graph from the declared pages.
    pub fn nav(&self) -> Result<NavGraph, NavError> {
        NavGraph::build(&self.pages)
    }

    /// Enabled markdown extensions. Unknown names were rejected by `validate`.
    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions::from_extensions(&self.build.markdown_extensions).unwrap_or_default()
    }

    /// Path of the record store.
    pub fn record_path(&self) -> PathBuf {
        self.build.docs_dir.join(&self.build.record_file)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config rooted at `root`, with a site name filled in.
/// Panics on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_config(root: &Path, extra: &str) -> SiteConfig {
    let content = format!("{extra}\n[site]\nname = \"Test\"\n");
    let (mut parsed, ignored) = SiteConfig::parse_with_ignored(&content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.finalize(root);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::parse_with_ignored("[site\nname = \"My Blog\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) = SiteConfig::parse_with_ignored(
            "[site]\nname = \"Blog\"\ntheme = \"dark\"\n[build]\nminify = true\n",
        )
        .unwrap();
        assert_eq!(config.site.name, "Blog");
        assert_eq!(ignored, ["site.theme", "build.minify"]);
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        let config = test_config(
            dir.path(),
            r#"
pages = ["index.md", ["catalog.md", "Catalog"]]

[build]
docs_dir = "content"
site_dir = "public"
strict = true
n_blogs_to_show = 3
jobs = 2
extra_css = ["style.css"]
"#,
        );

        let root = normalize_path(dir.path());
        assert_eq!(config.build.docs_dir, root.join("content"));
        assert_eq!(config.build.site_dir, root.join("public"));
        assert!(config.build.strict);
        assert_eq!(config.build.jobs, Some(2));
        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.record_path(), root.join("content/.record"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_build_args() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path(), "[build]\njobs = 8");
        config.apply_build_args(&BuildArgs {
            clean: true,
            strict: true,
            jobs: Some(2),
        });
        assert!(config.build.clean);
        assert!(config.build.strict);
        assert_eq!(config.build.jobs, Some(2));

        // --strict never turns strict mode off
        let mut config = test_config(dir.path(), "[build]\nstrict = true");
        config.apply_build_args(&BuildArgs::default());
        assert!(config.build.strict);
    }

    #[test]
    fn test_validate_rejects_bad_pages() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        let config = test_config(dir.path(), r#"pages = ["index.md", "index.markdown"]"#);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Pages(NavError::DuplicateHomepage { .. }))
        ));
    }

    #[test]
    fn test_validate_missing_docs_dir() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path(), "");
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors()[0].field, "build.docs_dir");
    }
}
