//! Command-line interface module.

mod args;
pub mod build;
pub mod json;
pub mod new;
pub mod status;

pub use args::{BuildArgs, Cli, Commands};
