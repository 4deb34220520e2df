//! to-build - an asset pipeline for static HTML documents.

mod address;
mod asset;
mod cli;
mod config;
mod core;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

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

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_all(&config),
        Commands::Serve { no_build, .. } => cli::serve::serve(&config, *no_build),
        Commands::Status => {
            cli::status::status(&config);
            Ok(())
        }
    }
}
