//! Render contexts and template values.
//!
//! [`SiteValues`] holds the site-wide values with absolute URLs. Every worker
//! clones it into its own [`RenderContext`], which re-targets the URL and
//! file frames per document and turns the values into relative URLs for the
//! template.

use serde::Serialize;
use std::path::Path;
use url::Url;

use crate::asset::find_by_kind;
use crate::config::SiteConfig;
use crate::core::{DocumentContext, FileKind};
use crate::generator::{Catalog, RecentPost};
use crate::nav::{MenuItem, NavGraph, PageId, PageLink};
use crate::pipeline::{Meta, TocEntry};
use crate::utils::date::DateTimeUtc;

/// Site-wide template values, URLs absolute (`/css/site.css`).
#[derive(Debug, Clone)]
pub struct SiteValues {
    pub site_name: String,
    pub site_author: Option<String>,
    pub description: String,
    pub site_url: Option<Url>,
    pub repo_url: Option<String>,
    pub repo_name: Option<String>,
    pub homepage_url: String,
    pub favicon: Option<String>,
    pub extra_css: Vec<String>,
    pub extra_javascript: Vec<String>,
    pub include_nav: bool,
    pub include_next_prev: bool,
    pub copyright: Option<String>,
    pub build_date: String,
}

impl SiteValues {
    pub fn from_config(config: &SiteConfig, nav: &NavGraph) -> Self {
        let docs_dir = &config.build.docs_dir;
        let many_pages = nav.len() > 1;

        let extra_css = match &config.build.extra_css {
            Some(list) => list.iter().map(|p| absolute(p)).collect(),
            None => find_by_kind(docs_dir, FileKind::Style),
        };
        let extra_javascript = match &config.build.extra_javascript {
            Some(list) => list.iter().map(|p| absolute(p)).collect(),
            None => find_by_kind(docs_dir, FileKind::Script),
        };

        Self {
            site_name: config.site.name.clone(),
            site_author: config.site.author.clone(),
            description: config.site.description.clone(),
            site_url: config.site.url.as_deref().and_then(base_url),
            repo_url: config.site.repo_url.clone(),
            repo_name: config.site.repo_name(),
            homepage_url: nav
                .homepage()
                .map_or_else(|| "/".to_string(), |id| nav.page(id).url.clone()),
            favicon: config.site.favicon.as_deref().map(absolute),
            extra_css,
            extra_javascript,
            include_nav: config.build.include_nav.unwrap_or(many_pages),
            include_next_prev: config.build.include_next_prev.unwrap_or(many_pages),
            copyright: config.site.copyright.clone(),
            build_date: DateTimeUtc::now().to_date_string(),
        }
    }

    /// Public URL of a site path, when `site.url` is set.
    pub fn canonical_url(&self, url: &str) -> Option<String> {
        let base = self.site_url.as_ref()?;
        base.join(url.trim_start_matches('/')).ok().map(String::from)
    }
}

/// Parse the public URL, making sure relative joins stay under its path.
fn base_url(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw).ok()?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Some(url)
}

/// Docs-relative path to a site URL; external URLs and absolute paths pass.
fn absolute(path: &str) -> String {
    if path.starts_with('/') || crate::utils::path::route::is_external_link(path) {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Site-wide values as seen from one document.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalContext {
    pub site_name: String,
    pub site_author: Option<String>,
    pub repo_url: Option<String>,
    pub repo_name: Option<String>,
    /// Relative URL of the site root, without trailing slash (`.`, `..`).
    pub base_url: String,
    pub homepage_url: String,
    pub favicon: Option<String>,
    pub extra_css: Vec<String>,
    pub extra_javascript: Vec<String>,
    pub nav: Vec<MenuItem>,
    pub include_nav: bool,
    pub include_next_prev: bool,
    pub copyright: Option<String>,
    pub version: &'static str,
    pub build_date: String,
}

/// Values of the document being rendered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageContext {
    pub page_title: Option<String>,
    pub page_description: Option<String>,
    pub page_date: Option<String>,
    pub page_tags: Vec<String>,
    pub content: String,
    pub toc: Vec<TocEntry>,
    pub meta: Meta,
    pub canonical_url: Option<String>,
    pub current_page: Option<PageLink>,
    pub previous_page: Option<PageLink>,
    pub next_page: Option<PageLink>,
}

/// Everything a template sees.
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
    #[serde(flatten)]
    pub global: &'a GlobalContext,
    #[serde(flatten)]
    pub page: &'a PageContext,
    pub catalog: Option<&'a Catalog>,
    pub recent: &'a [RecentPost],
}

/// Per-worker render state. Never shared between threads.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub doc: DocumentContext,
    site: SiteValues,
}

impl RenderContext {
    pub fn new(site: SiteValues) -> Self {
        Self {
            doc: DocumentContext::default(),
            site,
        }
    }

    /// Position the frames at a source document (docs-relative).
    pub fn set_source(&mut self, source: &Path) {
        self.doc.set_source(source);
    }

    /// Position the frames at a page without a source (e.g. `/404.html`).
    pub fn set_output_url(&mut self, url: &str) {
        self.doc = DocumentContext::for_output_url(url);
    }

    pub fn site(&self) -> &SiteValues {
        &self.site
    }

    /// Site values relative to the current document.
    pub fn global(&self, nav: &NavGraph, current: Option<PageId>) -> GlobalContext {
        let url = &self.doc.url;
        let relative = |list: &[String]| -> Vec<String> {
            list.iter().map(|u| url.make_relative(u)).collect()
        };

        GlobalContext {
            site_name: self.site.site_name.clone(),
            site_author: self.site.site_author.clone(),
            repo_url: self.site.repo_url.clone(),
            repo_name: self.site.repo_name.clone(),
            base_url: url.make_relative("/"),
            homepage_url: url.make_relative(&self.site.homepage_url),
            favicon: self.site.favicon.as_deref().map(|f| url.make_relative(f)),
            extra_css: relative(&self.site.extra_css),
            extra_javascript: relative(&self.site.extra_javascript),
            nav: nav.menu(current, url),
            include_nav: self.site.include_nav,
            include_next_prev: self.site.include_next_prev,
            copyright: self.site.copyright.clone(),
            version: env!("CARGO_PKG_VERSION"),
            build_date: self.site.build_date.clone(),
        }
    }
}
