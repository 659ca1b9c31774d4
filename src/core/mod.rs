//! Core types - pure abstractions shared across the codebase.

mod context;
mod kind;
mod link;
pub mod path;
mod state;

pub use context::{DocumentContext, UrlContext};
pub use kind::{FileKind, is_markup_file, is_rendered_file};
pub use link::{LinkKind, UrlParts};
pub use state::{is_shutdown, setup_shutdown_handler};
