//! Link classification utilities.

use crate::utils::path::route::is_external_link;

/// Syntactic classification of links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with URL scheme or host (https://, mailto:, //cdn, etc.)
    External(&'a str),
    /// Pure fragment/anchor link (#section). Value is anchor without `#`.
    Fragment(&'a str),
    /// Site-root-relative path (/about.md, /img/logo.png).
    SiteRoot(&'a str),
    /// File-relative path (./image.png, ../other.md).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if link.starts_with('/') {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }
}

/// A local URL split into path, query and fragment.
///
/// `query` and `fragment` keep their leading `?` / `#` so they can be
/// reattached verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    pub fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.find('#') {
            Some(idx) => url.split_at(idx),
            None => (url, ""),
        };
        let (path, query) = match rest.find('?') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        Self {
            path,
            query,
            fragment,
        }
    }

    /// Reassemble with a new path, preserving query and fragment.
    pub fn with_path(&self, path: &str) -> String {
        format!("{path}{}{}", self.query, self.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_external() {
        assert!(matches!(
            LinkKind::parse("https://example.com"),
            LinkKind::External("https://example.com")
        ));
        assert!(matches!(
            LinkKind::parse("mailto:user@example.com"),
            LinkKind::External(_)
        ));
        assert!(matches!(
            LinkKind::parse("//cdn.example.com/x.js"),
            LinkKind::External(_)
        ));
    }

    #[test]
    fn test_parse_fragment() {
        assert!(matches!(
            LinkKind::parse("#section"),
            LinkKind::Fragment("section")
        ));
        assert!(matches!(LinkKind::parse("#"), LinkKind::Fragment("")));
    }

    #[test]
    fn test_parse_site_root_and_relative() {
        assert!(matches!(
            LinkKind::parse("/img/logo.png"),
            LinkKind::SiteRoot("/img/logo.png")
        ));
        assert!(matches!(
            LinkKind::parse("../other.md#top"),
            LinkKind::FileRelative("../other.md#top")
        ));
        assert!(matches!(
            LinkKind::parse("image.png"),
            LinkKind::FileRelative("image.png")
        ));
    }

    #[test]
    fn test_url_parts_split() {
        let parts = UrlParts::split("a.md?v=1#sec");
        assert_eq!(parts.path, "a.md");
        assert_eq!(parts.query, "?v=1");
        assert_eq!(parts.fragment, "#sec");
        assert_eq!(parts.with_path("a.html"), "a.html?v=1#sec");

        let parts = UrlParts::split("a.md#x?y");
        assert_eq!(parts.path, "a.md");
        assert_eq!(parts.query, "");
        assert_eq!(parts.fragment, "#x?y");

        let parts = UrlParts::split("plain.png");
        assert_eq!(parts.with_path("../plain.png"), "../plain.png");
    }
}
