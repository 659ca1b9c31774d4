//! Media files: everything in the docs dir that is not a document.

mod process;
mod scan;

use std::path::{Path, PathBuf};

// Scanning (pure functions)
pub use scan::{find_by_kind, scan_media};

// Processing (side effects)
pub use process::copy_all;

/// Source and destination of one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoute {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Path relative to both roots.
    pub rel: PathBuf,
}

impl MediaRoute {
    pub fn new(source_root: &Path, rel: &Path, output_root: &Path) -> Self {
        Self {
            source: source_root.join(rel),
            output: output_root.join(rel),
            rel: rel.to_path_buf(),
        }
    }
}
