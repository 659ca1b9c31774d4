//! POSIX-style URL path arithmetic.
//!
//! Site URLs and source references always use `/`, so these helpers work on
//! strings rather than `Path` and behave the same on every host:
//! - `dirname`, `join`, `normalize` mirror POSIX path semantics
//! - `relative` computes the relative path between two absolute URL paths
//! - `is_external_link` classifies raw link values

/// Directory part of a path, POSIX style.
///
/// # Examples
/// ```ignore
/// assert_eq!(dirname("/sub/b.html"), "/sub");
/// assert_eq!(dirname("/a.html"), "/");
/// assert_eq!(dirname("a.md"), "");
/// ```
pub fn dirname(path: &str) -> &str {
    let head = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => return "",
    };
    // Keep a root made only of slashes, strip trailing slashes otherwise
    if head.bytes().all(|b| b == b'/') {
        head
    } else {
        head.trim_end_matches('/')
    }
}

/// Join two POSIX paths. An absolute `tail` replaces `base`.
pub fn join(base: &str, tail: &str) -> String {
    if tail.starts_with('/') || base.is_empty() {
        tail.to_string()
    } else if base.ends_with('/') {
        format!("{base}{tail}")
    } else {
        format!("{base}/{tail}")
    }
}

/// Collapse `.`, `..` and repeated slashes without touching the filesystem.
///
/// Leading `..` segments of a relative path are kept; `..` above the root of
/// an absolute path is dropped. An empty result is `.` (or `/`).
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Relative path from directory `start` to `target`, both site-absolute.
///
/// Relative inputs are anchored at `/` first.
///
/// # Examples
/// ```ignore
/// assert_eq!(relative("/img/x.png", "/sub"), "../img/x.png");
/// assert_eq!(relative("/sub/b.html", "/sub"), "b.html");
/// assert_eq!(relative("/", "/"), ".");
/// ```
pub fn relative(target: &str, start: &str) -> String {
    let target = normalize(&anchor(target));
    let start = normalize(&anchor(start));

    let target_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let start_parts: Vec<&str> = start.split('/').filter(|s| !s.is_empty()).collect();

    let common = target_parts
        .iter()
        .zip(&start_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat_n("..", start_parts.len() - common).collect();
    parts.extend(&target_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Prefix a path with `/` unless it already has one.
fn anchor(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.
/// or is a network-path reference like `//cdn.example.com/x.js`)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    let head = link.split(['/', '?', '#']).next().unwrap_or_default();
    head.find(':').is_some_and(|pos| {
        pos > 0
            && head[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
