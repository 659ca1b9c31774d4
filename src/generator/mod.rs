//! Outputs derived from the record store once the incremental build is done.
//!
//! - [`catalog`]: tag catalog and recency index
//! - [`pages`]: declared pages and the optional 404 page

pub mod catalog;
pub mod pages;

pub use catalog::Catalog;
pub use pages::{Excerpt, PageBuilder, RecentPost};
