//! File kind classification by extension.

use std::path::Path;

const MARKUP_EXTENSIONS: &[&str] = &["markdown", "mdown", "mkdn", "mkd", "md"];
const STYLE_EXTENSIONS: &[&str] = &["css"];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "javascript"];
const RENDERED_EXTENSIONS: &[&str] = &["html", "htm"];

/// Kind of a file in the docs tree, decided by its extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Markdown source - converted to HTML
    Markup,
    /// Stylesheet - linked from every page when `extra_css` is unset
    Style,
    /// Script - linked from every page when `extra_javascript` is unset
    Script,
    /// Already rendered HTML
    Rendered,
    /// Anything else (images, downloads, ...)
    Other,
}

impl FileKind {
    /// Detect kind from a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();
        if MARKUP_EXTENSIONS.contains(&ext) {
            Self::Markup
        } else if STYLE_EXTENSIONS.contains(&ext) {
            Self::Style
        } else if SCRIPT_EXTENSIONS.contains(&ext) {
            Self::Script
        } else if RENDERED_EXTENSIONS.contains(&ext) {
            Self::Rendered
        } else {
            Self::Other
        }
    }

    /// Detect kind from a file path.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Other, Self::from_extension)
    }
}

#[inline]
pub fn is_markup_file(path: &Path) -> bool {
    FileKind::from_path(path) == FileKind::Markup
}

#[inline]
pub fn is_rendered_file(path: &Path) -> bool {
    FileKind::from_path(path) == FileKind::Rendered
}
