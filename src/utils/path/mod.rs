//! Path and URL utilities.
//!
//! - [`fs`]: Filesystem helpers (`normalize_path`, `resolve_path`, `clear_dir`)
//! - [`route`]: POSIX URL arithmetic (`dirname`, `normalize`, `relative`, `is_external_link`)

pub mod fs;
pub mod route;

pub use fs::{clear_dir, has_visible_entries, is_hidden, normalize_path, resolve_path};
