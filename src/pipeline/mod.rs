//! Document processing pipeline.
//!
//! ```text
//! source ──► markdown::convert ──► template::Templates ──► HTML
//!              (html, toc, meta)     (theme or embedded)
//!                     │
//!              link::LinkRewriter on every event (relative URLs)
//! ```

pub mod link;
pub mod markdown;
pub mod template;

pub use link::{LinkError, LinkRewriter};
pub use markdown::{MarkdownOptions, Meta, TocEntry};
pub use template::{TemplateError, Templates};
