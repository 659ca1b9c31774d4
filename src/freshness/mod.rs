//! Freshness detection: which documents need rebuilding.
//!
//! Sources and outputs are compared by mtime; see [`stale`] for the scan
//! rules and [`ignore`] for the per-directory ignore file format.

mod ignore;
pub mod mtime;
mod stale;

pub use mtime::is_newer_than;
pub use stale::{StaleScan, StalenessDetector};
