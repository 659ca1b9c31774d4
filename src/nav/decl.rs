//! Declared pages as written in `inkpost.toml`.
//!
//! ```toml
//! pages = [
//!     "index.md",                                   # path only
//!     ["catalog.md", "Catalog"],                    # path, title
//!     ["guide/intro.md", "Guide", "Intro"],         # path, header, child title
//!     { path = "guide/setup.md", title = "Guide", child_title = "Setup" },
//! ]
//! ```

use serde::Deserialize;

/// One entry of the ordered `pages` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPageDecl")]
pub struct PageDecl {
    /// Source path relative to the docs dir, `/`-separated.
    pub path: String,
    pub title: Option<String>,
    pub child_title: Option<String>,
}

impl PageDecl {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            child_title: None,
        }
    }

    #[cfg(test)]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[cfg(test)]
    pub fn with_child_title(mut self, child_title: impl Into<String>) -> Self {
        self.child_title = Some(child_title.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPageDecl {
    Path(String),
    List(Vec<String>),
    Table {
        path: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        child_title: Option<String>,
    },
}

impl TryFrom<RawPageDecl> for PageDecl {
    type Error = String;

    fn try_from(raw: RawPageDecl) -> Result<Self, Self::Error> {
        match raw {
            RawPageDecl::Path(path) => Ok(Self::new(path)),
            RawPageDecl::List(items) => {
                let len = items.len();
                let mut items = items.into_iter();
                match (items.next(), items.next(), items.next()) {
                    (Some(path), title, child_title) if len <= 3 => Ok(Self {
                        path,
                        title,
                        child_title,
                    }),
                    _ => Err(format!(
                        "page entry must have 1 to 3 items [path, title, child_title], found {len}"
                    )),
                }
            }
            RawPageDecl::Table {
                path,
                title,
                child_title,
            } => Ok(Self {
                path,
                title,
                child_title,
            }),
        }
    }
}
