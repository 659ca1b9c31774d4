//! Relative link rewriting, applied to parser events during conversion.
//!
//! Rewrites markdown link and image destinations, plus `href` on `<a>` and
//! `src` on `<img>` in raw HTML, so every local reference works from the
//! document's output location:
//!
//! | Link              | From `sub/b.md`        | Result              |
//! |-------------------|------------------------|---------------------|
//! | `https://x.org`   |                        | unchanged           |
//! | `#top`            |                        | unchanged           |
//! | `../a.md#intro`   |                        | `../a.html#intro`   |
//! | `img/x.png`       | `docs/sub/img/x.png` missing | `../img/x.png` |
//! | `/img/x.png`      |                        | `../img/x.png`      |
//!
//! Raw HTML is parsed with `tl`; links inside comments are left alone.
//!
//! Markup targets are checked for existence under the docs directory. In
//! strict mode a missing target is an error; otherwise it is reported and the
//! link is rewritten anyway.

use percent_encoding::percent_decode_str;
use pulldown_cmark::{CowStr, Event, LinkType, Tag};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use crate::core::path::to_site_url;
use crate::core::{DocumentContext, LinkKind, UrlParts, is_markup_file};
use crate::utils::html::{escape_attr, unescape};
use crate::utils::path::route;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("`{document}` links to `{target}` which does not exist")]
    Broken { document: String, target: String },
}

/// Rewrites local links relative to one document.
#[derive(Debug, Clone, Copy)]
pub struct LinkRewriter<'a> {
    docs_dir: &'a Path,
    strict: bool,
    prefix: Option<&'a str>,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(docs_dir: &'a Path, strict: bool) -> Self {
        Self {
            docs_dir,
            strict,
            prefix: None,
        }
    }

    /// Prepend `prefix` to every rewritten local URL.
    ///
    /// Used when a document's HTML is shown on a page in another directory.
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = match prefix {
            "" | "." => None,
            p => Some(p),
        };
        self
    }

    /// Rewrite the links carried by one parser event of the document `doc`.
    ///
    /// Missing targets seen in non-strict mode are pushed to `broken`.
    pub fn rewrite_event<'e>(
        &self,
        event: Event<'e>,
        doc: &DocumentContext,
        broken: &mut Vec<String>,
    ) -> Result<Event<'e>, LinkError> {
        Ok(match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) if !matches!(link_type, LinkType::Email) => Event::Start(Tag::Link {
                link_type,
                dest_url: self.rewrite_dest(dest_url, doc, broken)?,
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: self.rewrite_dest(dest_url, doc, broken)?,
                title,
                id,
            }),
            Event::Html(html) => Event::Html(self.rewrite_html(html, doc, broken)?),
            Event::InlineHtml(html) => Event::InlineHtml(self.rewrite_html(html, doc, broken)?),
            other => other,
        })
    }

    fn rewrite_dest<'e>(
        &self,
        url: CowStr<'e>,
        doc: &DocumentContext,
        broken: &mut Vec<String>,
    ) -> Result<CowStr<'e>, LinkError> {
        Ok(match self.rewrite_url(&url, doc, broken)? {
            Some(new_url) => CowStr::from(new_url),
            None => url,
        })
    }

    /// Rewrite `href`/`src` values in a raw HTML fragment, keeping the rest
    /// of the markup byte for byte.
    fn rewrite_html<'e>(
        &self,
        html: CowStr<'e>,
        doc: &DocumentContext,
        broken: &mut Vec<String>,
    ) -> Result<CowStr<'e>, LinkError> {
        let mut edits = Vec::new();
        for value in attr_values(&html) {
            let url = unescape(&html[value.clone()]);
            if let Some(new_url) = self.rewrite_url(&url, doc, broken)? {
                edits.push((value, escape_attr(&new_url).into_owned()));
            }
        }
        if edits.is_empty() {
            return Ok(html);
        }

        let mut out = String::with_capacity(html.len() + 16);
        let mut last = 0;
        for (range, value) in edits {
            out.push_str(&html[last..range.start]);
            out.push_str(&value);
            last = range.end;
        }
        out.push_str(&html[last..]);
        Ok(CowStr::from(out))
    }

    /// Rewrite a single URL. `None` means the URL is left untouched.
    pub fn rewrite_url(
        &self,
        url: &str,
        doc: &DocumentContext,
        broken: &mut Vec<String>,
    ) -> Result<Option<String>, LinkError> {
        let parts = UrlParts::split(url);
        if parts.path.is_empty() {
            return Ok(None);
        }

        let path = match LinkKind::parse(url) {
            LinkKind::External(_) | LinkKind::Fragment(_) => return Ok(None),
            _ if is_markup_file(Path::new(parts.path)) => self.markup_url(parts.path, doc, broken)?,
            LinkKind::SiteRoot(_) => doc.url.make_relative(parts.path),
            LinkKind::FileRelative(_) => self.media_url(parts.path, doc),
        };

        let path = match self.prefix {
            Some(prefix) => route::join(prefix, &path),
            None => path,
        };
        Ok(Some(parts.with_path(&path)))
    }

    fn markup_url(
        &self,
        path: &str,
        doc: &DocumentContext,
        broken: &mut Vec<String>,
    ) -> Result<String, LinkError> {
        let target = if path.starts_with('/') {
            route::normalize(path.trim_start_matches('/'))
        } else {
            doc.file.make_absolute(path)
        };

        if !self.exists(&target) {
            if self.strict {
                return Err(LinkError::Broken {
                    document: doc.file.current_file().to_string(),
                    target,
                });
            }
            broken.push(target.clone());
        }

        if target.starts_with("..") {
            // Outside the docs tree: only swap the extension
            let swapped = crate::core::path::to_output_path(Path::new(path));
            return Ok(route::normalize(&swapped.to_string_lossy().replace('\\', "/")));
        }
        Ok(doc.url.make_relative(&to_site_url(Path::new(&target))))
    }

    /// Media next to the document wins; otherwise the path is read from the
    /// site root, so `img/x.png` works the same from every directory.
    fn media_url(&self, path: &str, doc: &DocumentContext) -> String {
        let beside = doc.file.make_absolute(path);
        if !beside.starts_with("..") && self.exists(&beside) {
            return doc.url.make_relative(&format!("/{beside}"));
        }
        doc.url
            .make_relative(&format!("/{}", route::normalize(path).trim_start_matches("../")))
    }

    fn exists(&self, target: &str) -> bool {
        if target.starts_with("..") {
            return false;
        }
        let decoded = percent_decode_str(target).decode_utf8_lossy();
        self.docs_dir.join(decoded.as_ref()).exists()
    }
}

/// Byte ranges of `href` on `<a>` and `src` on `<img>` values in `html`,
/// in document order. Comment contents are never entered.
fn attr_values(html: &str) -> Vec<Range<usize>> {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return Vec::new();
    };

    let mut values: Vec<Range<usize>> = dom
        .nodes()
        .iter()
        .filter_map(|node| match node {
            tl::Node::Tag(tag) => Some(tag),
            tl::Node::Raw(_) | tl::Node::Comment(_) => None,
        })
        .filter_map(|tag| {
            let name = tag.name().as_utf8_str();
            let attr = if name.eq_ignore_ascii_case("a") {
                "href"
            } else if name.eq_ignore_ascii_case("img") {
                "src"
            } else {
                return None;
            };
            let start = offset_in(html, tag.raw().as_bytes())?;
            let value = attr_span(&html[start..], attr)?;
            Some(start + value.start..start + value.end)
        })
        .collect();
    values.sort_by_key(|range| range.start);
    values.dedup();
    values
}

/// Offset of the `<` opening the tag whose source is `part`, a subslice of
/// `whole`.
fn offset_in(whole: &str, part: &[u8]) -> Option<usize> {
    let start = (part.as_ptr() as usize).checked_sub(whole.as_ptr() as usize)?;
    if start + part.len() > whole.len() {
        return None;
    }
    whole.get(..start + 1)?.rfind('<')
}

/// Value range of attribute `name` in the open tag at the start of `tag`.
///
/// Quoted values may hold `>`; unquoted values end at whitespace or `>`.
fn attr_span(tag: &str, name: &str) -> Option<Range<usize>> {
    let bytes = tag.as_bytes();
    let is_space = |b: u8| b.is_ascii_whitespace();

    // Tag name
    let mut i = skip_until(bytes, 1, |b| is_space(b) || b == b'>' || b == b'/');
    loop {
        i = skip_until(bytes, i, |b| !is_space(b) && b != b'/');
        if i >= bytes.len() || bytes[i] == b'>' {
            return None;
        }

        let key_start = i;
        i = skip_until(bytes, i, |b| is_space(b) || matches!(b, b'=' | b'>' | b'/'));
        let key = &tag[key_start..i];
        i = skip_until(bytes, i, |b| !is_space(b));
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i = skip_until(bytes, i + 1, |b| !is_space(b));

        let value = match bytes.get(i) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = i + 1;
                let end = start + tag[start..].find(quote as char)?;
                i = end + 1;
                start..end
            }
            Some(_) => {
                let start = i;
                i = skip_until(bytes, i, |b| is_space(b) || b == b'>');
                start..i
            }
            None => return None,
        };
        if key.eq_ignore_ascii_case(name) {
            return Some(value);
        }
    }
}

fn skip_until(bytes: &[u8], mut i: usize, stop: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && !stop(bytes[i]) {
        i += 1;
    }
    i
}
