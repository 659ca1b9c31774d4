//! Markdown to HTML conversion using pulldown-cmark.
//!
//! A document may start with a metadata block:
//!
//! ```text
//! Title: Notes on parsing
//! Date:  2024-06-15
//! Tags:  rust
//!        parsing
//!
//! # Body starts here
//! ```
//!
//! Keys are case-insensitive (stored lowercase); indented lines continue the
//! previous key. The block may be wrapped in `---` fences and ends at the
//! first blank line.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Document metadata: lowercase key to values.
pub type Meta = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("unknown markdown extension `{0}`")]
    UnknownExtension(String),
}

/// Options for markdown conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Extension names accepted in `build.markdown_extensions`.
    pub const KNOWN: [&'static str; 5] = [
        "tables",
        "footnotes",
        "strikethrough",
        "tasklists",
        "heading_attributes",
    ];

    /// Enable the named extensions.
    pub fn from_extensions<S: AsRef<str>>(names: &[S]) -> Result<Self, MarkdownError> {
        let mut opts = Self::default();
        for name in names {
            match name.as_ref().trim() {
                "tables" => opts.tables = true,
                "footnotes" => opts.footnotes = true,
                "strikethrough" => opts.strikethrough = true,
                "tasklists" => opts.task_lists = true,
                "heading_attributes" => opts.heading_attributes = true,
                other => return Err(MarkdownError::UnknownExtension(other.to_string())),
            }
        }
        Ok(opts)
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// One outline entry; nested by heading level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    /// In-page anchor (`#id`).
    pub url: String,
    pub level: u8,
    pub children: Vec<TocEntry>,
}

/// Output of one conversion.
#[derive(Debug, Clone, Default)]
pub struct Converted {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub meta: Meta,
    /// Plain text of the first level-1 heading.
    pub title: Option<String>,
}

/// Convert a markdown document (metadata block included).
///
/// Every parser event passes through `map` before rendering; link rewriting
/// hooks in there.
pub fn convert<'a, E>(
    source: &'a str,
    options: MarkdownOptions,
    map: impl FnMut(Event<'a>) -> Result<Event<'a>, E>,
) -> Result<Converted, E> {
    let (meta, body) = split_meta(source);
    let mut converted = convert_body(body, options, map)?;
    converted.meta = meta;
    Ok(converted)
}

/// Convert markdown without looking for a metadata block.
pub fn convert_body<'a, E>(
    body: &'a str,
    options: MarkdownOptions,
    map: impl FnMut(Event<'a>) -> Result<Event<'a>, E>,
) -> Result<Converted, E> {
    let mut events = parse(body, options)
        .into_iter()
        .map(map)
        .collect::<Result<Vec<_>, E>>()?;

    let mut slugs = SlugSet::default();
    let mut toc = Vec::new();
    let mut title = None;

    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
            i += 1;
            continue;
        };
        let level = *level as u8;
        let explicit = id.as_ref().map(|id| id.to_string());

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(t) | Event::Code(t) = &events[end] {
                text.push_str(t);
            }
            end += 1;
        }
        let text = text.trim().to_string();

        let anchor = match explicit {
            Some(id) => slugs.reserve(id),
            None => {
                let anchor = slugs.unique(&text);
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(CowStr::from(anchor.clone()));
                }
                anchor
            }
        };

        if level == 1 && title.is_none() && !text.is_empty() {
            title = Some(text.clone());
        }
        insert_toc(
            &mut toc,
            TocEntry {
                url: format!("#{anchor}"),
                title: text,
                level,
                children: Vec::new(),
            },
        );
        i = end + 1;
    }

    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    Ok(Converted {
        html: out,
        toc,
        meta: Meta::new(),
        title,
    })
}

/// Parser events with the lines of each raw HTML block joined into one
/// `Html` event, so a block spanning several lines is seen whole.
fn parse(body: &str, options: MarkdownOptions) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut in_block = false;
    for event in Parser::new_ext(body, options.to_pulldown_options()) {
        match event {
            Event::Start(Tag::HtmlBlock) => in_block = true,
            Event::End(TagEnd::HtmlBlock) => in_block = false,
            Event::Html(line) if in_block => {
                if let Some(Event::Html(block)) = events.last_mut() {
                    let mut joined = String::from(&**block);
                    joined.push_str(&line);
                    *block = CowStr::from(joined);
                } else {
                    events.push(Event::Html(line));
                }
                continue;
            }
            _ => {}
        }
        events.push(event);
    }
    events
}

fn insert_toc(list: &mut Vec<TocEntry>, entry: TocEntry) {
    match list.last_mut() {
        Some(last) if last.level < entry.level => insert_toc(&mut last.children, entry),
        _ => list.push(entry),
    }
}

/// Heading anchors, deduplicated within one document.
#[derive(Default)]
struct SlugSet {
    seen: FxHashMap<String, usize>,
}

impl SlugSet {
    fn reserve(&mut self, id: String) -> String {
        self.seen.entry(id.clone()).or_insert(0);
        id
    }

    fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() { "section".to_string() } else { base };
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}_{}", *count - 1)
        }
    }
}

/// Heading text to anchor id: word characters, `-` and `_`, lowercase.
pub fn slugify(text: &str) -> String {
    static RE_STRIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
    static RE_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

    let stripped = RE_STRIP.replace_all(text, "");
    let lower = stripped.trim().to_lowercase();
    RE_DASH.replace_all(&lower, "-").into_owned()
}

/// Split the leading metadata block off a document.
///
/// Returns the parsed metadata and the remaining body.
pub fn split_meta(source: &str) -> (Meta, &str) {
    static RE_KEY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[ ]{0,3}([A-Za-z0-9_-]+):\s*(.*)$").unwrap());
    static RE_MORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ ]{4,}(.*)$").unwrap());
    static RE_BEGIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3}(\s.*)?$").unwrap());
    static RE_END: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(-{3}|\.{3})(\s.*)?$").unwrap());

    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut meta = Meta::new();
    let mut key: Option<String> = None;
    let mut offset = 0;
    let mut first = true;

    for line in source.split_inclusive('\n') {
        let text = line.trim_end_matches(['\n', '\r']);

        if first {
            first = false;
            if RE_BEGIN.is_match(text) {
                offset += line.len();
                continue;
            }
        }

        if text.trim().is_empty() || RE_END.is_match(text) {
            offset += line.len();
            break;
        }

        if let Some(caps) = RE_KEY.captures(text) {
            let k = caps[1].to_lowercase();
            meta.entry(k.clone())
                .or_default()
                .push(caps[2].trim().to_string());
            key = Some(k);
        } else if let (Some(k), Some(caps)) = (&key, RE_MORE.captures(text)) {
            if let Some(values) = meta.get_mut(k) {
                values.push(caps[1].trim().to_string());
            }
        } else {
            break;
        }
        offset += line.len();
    }

    if meta.is_empty() {
        // Not a metadata block: leave the document untouched
        return (meta, source);
    }
    (meta, &source[offset..])
}
