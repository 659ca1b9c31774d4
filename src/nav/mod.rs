//! Site navigation graph.
//!
//! Built once from the ordered `pages` declaration, before any build work:
//!
//! ```text
//! pages = ["index.md", "a.md", ["guide/intro.md", "Guide", "Intro"]]
//!
//! Home - /index.html          previous/next chain:
//! A - /a.html                 index -> a -> guide/intro
//! Guide
//!     Intro - /guide/intro.html
//! ```
//!
//! Nodes are stored in arenas and never mutated after construction. Which
//! entry is "active" is always answered relative to an explicit current page,
//! so concurrent renders can share one graph.

mod decl;
mod node;
mod title;

pub use decl::PageDecl;
pub use node::{Header, HeaderId, NavItem, Page, PageId};
pub use title::filename_to_title;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::{
    UrlContext, is_markup_file,
    path::{is_homepage, to_output_path, to_site_url},
};
use crate::utils::path::route;

/// Errors raised while building the navigation graph.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("both `{first}` and `{second}` are declared as the homepage")]
    DuplicateHomepage { first: String, second: String },

    #[error("invalid page declaration `{path}`: {reason}")]
    InvalidPageDeclaration { path: String, reason: String },
}

/// Ordered pages and section headers with previous/next links.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    pages: Vec<Page>,
    headers: Vec<Header>,
    items: Vec<NavItem>,
    homepage: Option<PageId>,
}

impl NavGraph {
    /// Build the graph from declarations, in declaration order.
    pub fn build(decls: &[PageDecl]) -> Result<Self, NavError> {
        let mut graph = Self::default();
        let mut outputs: BTreeMap<PathBuf, String> = BTreeMap::new();

        for decl in decls {
            let path = validate_path(&decl.path)?;
            let source = PathBuf::from(&path);
            let id = PageId(graph.pages.len());

            if is_homepage(&source) {
                if let Some(first) = graph.homepage {
                    return Err(NavError::DuplicateHomepage {
                        first: graph.pages[first.0].source.display().to_string(),
                        second: path,
                    });
                }
                graph.homepage = Some(id);
            }

            let output = to_output_path(&source);
            if let Some(previous) = outputs.insert(output.clone(), path.clone()) {
                return Err(NavError::InvalidPageDeclaration {
                    reason: format!(
                        "output `{}` is already produced by `{previous}`",
                        output.display()
                    ),
                    path,
                });
            }

            let (title, child_title) = resolve_titles(&path, decl);
            let page_title = child_title.clone().unwrap_or_else(|| title.clone());

            let ancestors = match child_title {
                None => {
                    graph.items.push(NavItem::Page(id));
                    vec![]
                }
                Some(_) => vec![graph.header_for(title, id)],
            };

            let previous = id.0.checked_sub(1).map(PageId);
            if let Some(prev) = previous {
                graph.pages[prev.0].next = Some(id);
            }

            graph.pages.push(Page {
                title: page_title,
                url: to_site_url(&source),
                source,
                output,
                ancestors,
                previous,
                next: None,
            });
        }

        Ok(graph)
    }

    /// Append `page` to the last top-level header if it carries `title`,
    /// otherwise open a new header.
    fn header_for(&mut self, title: String, page: PageId) -> HeaderId {
        if let Some(NavItem::Header(last)) = self.items.last()
            && self.headers[last.0].title == title
        {
            let last = *last;
            self.headers[last.0].children.push(page);
            return last;
        }

        let id = HeaderId(self.headers.len());
        self.headers.push(Header {
            title,
            children: vec![page],
        });
        self.items.push(NavItem::Header(id));
        id
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    #[cfg(test)]
    pub fn header(&self, id: HeaderId) -> &Header {
        &self.headers[id.0]
    }

    /// Top-level menu entries.
    #[cfg(test)]
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn homepage(&self) -> Option<PageId> {
        self.homepage
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Iterate pages in declared order by following the next links.
    ///
    /// Each call returns a new iterator starting from the first page.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            graph: self,
            next: (!self.pages.is_empty()).then_some(PageId(0)),
        }
    }

    /// Find a page by its source path (relative to the docs dir).
    pub fn find_source(&self, source: &Path) -> Option<PageId> {
        self.pages
            .iter()
            .position(|p| p.source == source)
            .map(PageId)
    }

    /// True if `source` is a declared page.
    pub fn is_declared(&self, source: &Path) -> bool {
        self.find_source(source).is_some()
    }

    /// Whether `item` is the current page or encloses it.
    pub fn is_active(&self, item: NavItem, current: Option<PageId>) -> bool {
        let Some(current) = current else {
            return false;
        };
        match item {
            NavItem::Page(id) => id == current,
            NavItem::Header(id) => self.pages[current.0].ancestors.contains(&id),
        }
    }

    /// Menu view for one document, with URLs relative to `url`.
    pub fn menu(&self, current: Option<PageId>, url: &UrlContext) -> Vec<MenuItem> {
        self.items
            .iter()
            .map(|&item| match item {
                NavItem::Page(id) => self.menu_page(id, current, url),
                NavItem::Header(id) => MenuItem {
                    title: self.headers[id.0].title.clone(),
                    url: None,
                    active: self.is_active(item, current),
                    children: self.headers[id.0]
                        .children
                        .iter()
                        .map(|&child| self.menu_page(child, current, url))
                        .collect(),
                },
            })
            .collect()
    }

    fn menu_page(&self, id: PageId, current: Option<PageId>, url: &UrlContext) -> MenuItem {
        let page = &self.pages[id.0];
        MenuItem {
            title: page.title.clone(),
            url: Some(url.make_relative(&page.url)),
            active: self.is_active(NavItem::Page(id), current),
            children: vec![],
        }
    }

    /// Template view of a single page, relative to `url`.
    pub fn link(&self, id: PageId, url: &UrlContext) -> PageLink {
        let page = &self.pages[id.0];
        PageLink {
            title: page.title.clone(),
            url: url.make_relative(&page.url),
            is_homepage: page.is_homepage(),
        }
    }
}

/// Iterator over pages in declared order.
pub struct Walk<'a> {
    graph: &'a NavGraph,
    next: Option<PageId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (PageId, &'a Page);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let page = &self.graph.pages[id.0];
        self.next = page.next;
        Some((id, page))
    }
}

/// A rendered menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: String,
    /// `None` for headers.
    pub url: Option<String>,
    pub active: bool,
    pub children: Vec<MenuItem>,
}

/// A page reference as exposed to templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub title: String,
    pub url: String,
    pub is_homepage: bool,
}

impl fmt::Display for NavGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match *item {
                NavItem::Page(id) => {
                    let page = &self.pages[id.0];
                    writeln!(f, "{} - {}", page.title, page.url)?;
                }
                NavItem::Header(id) => {
                    let header = &self.headers[id.0];
                    writeln!(f, "{}", header.title)?;
                    for child in &header.children {
                        let page = &self.pages[child.0];
                        writeln!(f, "    {} - {}", page.title, page.url)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Check a declared path and return its normalized form.
fn validate_path(raw: &str) -> Result<String, NavError> {
    let invalid = |reason: &str| NavError::InvalidPageDeclaration {
        path: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("path is empty"));
    }
    if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
        return Err(invalid("path must be relative to the docs dir"));
    }

    let normalized = route::normalize(trimmed);
    if normalized.split('/').any(|seg| seg == "..") {
        return Err(invalid("path must stay inside the docs dir"));
    }
    if !is_markup_file(Path::new(&normalized)) {
        return Err(invalid("not a markdown file"));
    }
    Ok(normalized)
}

/// Resolve `(title, child_title)` for a declaration.
///
/// A bare nested path (`guide/intro.md`) nests automatically under a header
/// named after its first component.
fn resolve_titles(path: &str, decl: &PageDecl) -> (String, Option<String>) {
    let mut child_title = decl.child_title.clone().filter(|t| !t.is_empty());

    if decl.title.is_none() && child_title.is_none() && path.contains('/') {
        let filename = path.rsplit('/').next().unwrap_or(path);
        child_title = Some(filename_to_title(filename));
    }

    let title = decl.title.clone().unwrap_or_else(|| {
        let first = path.split('/').next().unwrap_or(path);
        filename_to_title(first)
    });

    (title, child_title)
}
