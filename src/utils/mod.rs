//! Utility modules for the site builder.

pub mod date;
pub mod html;
pub mod path;
pub mod plural;

pub use plural::plural_count;
