//! Default titles derived from file names.

use std::path::Path;

use crate::core::path::is_homepage;

/// Generate a default title from a file or directory name.
///
/// - the homepage (`index.*`) is `Home`
/// - the last extension is dropped
/// - `-` and `_` become spaces
/// - an all-lowercase name gets its first letter capitalized, anything
///   else is kept as written
///
/// # Examples
/// ```ignore
/// assert_eq!(filename_to_title("getting-started.md"), "Getting started");
/// assert_eq!(filename_to_title("FAQ.md"), "FAQ");
/// ```
pub fn filename_to_title(filename: &str) -> String {
    if is_homepage(Path::new(filename)) {
        return "Home".to_string();
    }

    let stem = strip_extension(filename);
    let title = stem.replace(['-', '_'], " ");

    if title.to_lowercase() == title {
        capitalize(&title)
    } else {
        title
    }
}

/// Drop the final `.ext`, keeping dot-files like `.config` intact.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if filename[..idx].chars().any(|c| c != '.') => &filename[..idx],
        _ => filename,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
