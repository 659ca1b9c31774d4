//! Per-document coordinate frames for link computation.
//!
//! - [`UrlContext`]: turns an absolute site URL into a URL relative to the
//!   current document's output location.
//! - [`FileContext`]: turns a relative hyperlink into a source path (relative
//!   to the docs root) so the target can be checked for existence.
//!
//! Both are plain values owned by whoever renders the document. Concurrent
//! builds construct one pair per worker and never share them.

use std::path::Path;

use super::path::{to_posix, to_site_url};
use crate::utils::path::route;

/// Coordinate frame for relative URLs, anchored at the directory of the
/// current document's output URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlContext {
    base_path: String,
}

impl Default for UrlContext {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
        }
    }
}

impl UrlContext {
    /// Create a context for the document served at `current_url`.
    pub fn new(current_url: &str) -> Self {
        let mut ctx = Self::default();
        ctx.set_current_url(current_url);
        ctx
    }

    pub fn set_current_url(&mut self, current_url: &str) {
        self.base_path = route::dirname(current_url).to_string();
    }

    /// Directory of the current document (POSIX form).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Make a site-absolute URL relative to the current document.
    ///
    /// URLs that are already relative pass through unchanged.
    pub fn make_relative(&self, url: &str) -> String {
        if url.starts_with('/') {
            route::relative(url, &self.anchored_base())
        } else {
            url.to_string()
        }
    }

    /// Resolve a relative URL back to a site-absolute one.
    #[cfg(test)]
    pub fn resolve(&self, url: &str) -> String {
        route::normalize(&route::join(&self.anchored_base(), url))
    }

    fn anchored_base(&self) -> String {
        format!("/{}", self.base_path.trim_start_matches('/'))
    }
}

/// Coordinate frame for source references, anchored at the directory of the
/// current document's source path (relative to the docs root).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    current_file: String,
    base_path: String,
}

impl FileContext {
    pub fn new(current_path: &str) -> Self {
        let mut ctx = Self::default();
        ctx.set_current_path(current_path);
        ctx
    }

    pub fn set_current_path(&mut self, current_path: &str) {
        self.current_file = current_path.to_string();
        self.base_path = route::dirname(current_path).to_string();
    }

    /// Source path of the current document.
    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    /// Resolve a relative reference into a normalized source path.
    pub fn make_absolute(&self, path: &str) -> String {
        route::normalize(&route::join(&self.base_path, path))
    }
}

/// The paired URL and file frames of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    pub url: UrlContext,
    pub file: FileContext,
}

impl DocumentContext {
    /// Frames for a source file given relative to the docs root.
    pub fn for_source(source: &Path) -> Self {
        Self {
            url: UrlContext::new(&to_site_url(source)),
            file: FileContext::new(&to_posix(source)),
        }
    }

    /// Frames for a page that has no source file (e.g. `404.html`).
    pub fn for_output_url(url: &str) -> Self {
        Self {
            url: UrlContext::new(url),
            file: FileContext::new(url.trim_start_matches('/')),
        }
    }

    /// Re-target both frames to another source file.
    pub fn set_source(&mut self, source: &Path) {
        self.url.set_current_url(&to_site_url(source));
        self.file.set_current_path(&to_posix(source));
    }
}
