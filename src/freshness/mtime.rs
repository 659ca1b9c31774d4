//! Mtime-based freshness for rendered documents.
//!
//! A document is fresh when its output is at least as new as its source.
//! Equal timestamps count as fresh, so a source and output written within
//! the same filesystem tick do not trigger a rebuild.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check whether an output with mtime `output` is fresh for a source with
/// mtime `source`.
///
/// A missing output is never fresh; an unreadable source mtime is treated as
/// fresh only if the output exists.
pub fn is_output_fresh(output: Option<SystemTime>, source: Option<SystemTime>) -> bool {
    match (output, source) {
        (Some(output), Some(source)) => output >= source,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Check if file A is strictly newer than file B
///
/// Returns `false` if either file doesn't exist or times can't be compared
pub fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (get_mtime(a), get_mtime(b)) else {
        return false;
    };
    a_time > b_time
}
