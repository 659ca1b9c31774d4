//! Navigation nodes.
//!
//! Pages and headers live in arenas owned by [`NavGraph`](super::NavGraph)
//! and refer to each other by index. Headers own their children's ids; pages
//! hold non-owning ids of their ancestors and neighbours.

use std::path::PathBuf;

use crate::core::path::is_homepage;

/// Index of a page in the navigation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub(super) usize);

/// Index of a header in the navigation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderId(pub(super) usize);

/// A declared page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    /// Source path relative to the docs dir.
    pub source: PathBuf,
    /// Output path relative to the site dir.
    pub output: PathBuf,
    /// Absolute site URL (`/sub/b.html`).
    pub url: String,
    pub ancestors: Vec<HeaderId>,
    pub previous: Option<PageId>,
    pub next: Option<PageId>,
}

impl Page {
    pub fn is_homepage(&self) -> bool {
        is_homepage(&self.source)
    }

    /// Fresh URL/file frames positioned at this page.
    #[cfg(test)]
    pub fn context(&self) -> crate::core::DocumentContext {
        crate::core::DocumentContext::for_source(&self.source)
    }
}

/// A section header grouping pages in the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub children: Vec<PageId>,
}

/// A top-level menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Page(PageId),
    Header(HeaderId),
}
