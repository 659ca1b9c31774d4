//! inkpost - An incremental static blog builder for Markdown sites.

mod asset;
mod cache;
mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod freshness;
mod generator;
mod logger;
mod nav;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // Scaffolding runs before any config exists
    if let Commands::New { dir } = &cli.command {
        return cli::new::new_project(dir).map(|_| ());
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_site(&config).map(|_| ()),
        Commands::Status => cli::status::show_status(&config).map(|_| ()),
        Commands::Json => cli::json::dump_json(&config).map(|_| ()),
        Commands::New { .. } => Ok(()),
    }
}
