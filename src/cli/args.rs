//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// inkpost: incremental static blog builder
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: inkpost.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "inkpost.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build stale documents and regenerate declared pages
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// List documents that would be rebuilt, without building
    #[command(visible_alias = "s")]
    Status,

    /// Write the declared pages as JSON instead of HTML
    Json,

    /// Create a new project
    New {
        /// Directory to create the project in
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Empty the site directory before building (hidden files are kept)
    #[arg(short, long)]
    pub clean: bool,

    /// Fail the build on links to missing documents
    #[arg(long)]
    pub strict: bool,

    /// Number of worker threads (default: available parallelism)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,
}
