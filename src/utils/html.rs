//! HTML text helpers.
//!
//! - `escape_attr()` - entity escaping for attribute values
//! - `unescape()` - entity decoding for attribute values read back from HTML

use std::borrow::Cow;

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape an attribute value. `'` is left alone.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references; unknown
/// entities are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(idx) = rest.find('&') {
        result.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let entity = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .map(|end| &rest[1..=end]);

        let decoded = entity.and_then(|entity| match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            s if s.starts_with("#x") || s.starts_with("#X") => {
                u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
            }
            s if s.starts_with('#') => s[1..].parse().ok().and_then(char::from_u32),
            _ => None,
        });

        match (entity, decoded) {
            (Some(entity), Some(c)) => {
                result.push(c);
                rest = &rest[entity.len() + 2..];
            }
            _ => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("normal"), "normal");
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
        assert_eq!(escape_attr("it's"), "it's");
        assert_eq!(escape_attr("a.html?x=1&y=2"), "a.html?x=1&amp;y=2");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("hello"), "hello");
        assert_eq!(unescape("&lt;script&gt;"), "<script>");
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(unescape("&#39;"), "'");
        assert_eq!(unescape("&#x27;"), "'");
        assert_eq!(unescape("&#65;"), "A");
        assert_eq!(unescape("&nbsp;"), "\u{00A0}");
    }

    #[test]
    fn test_unescape_keeps_unknown() {
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("x&"), "x&");
        assert_eq!(unescape("&;"), "&;");
    }
}
