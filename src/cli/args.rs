//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::core::BuildMode;

/// Asset pipeline for static HTML documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "to-build.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build entry documents for every selected mode
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then start the development, staging and production servers
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Serve the existing output without building first
        #[arg(long)]
        no_build: bool,
    },

    /// Report which preview servers are up
    Status,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Entry HTML documents (default: index.html)
    #[arg(value_name = "ENTRY", value_hint = clap::ValueHint::FilePath)]
    pub entries: Vec<PathBuf>,

    /// Output directory path
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Lookup root, searched after the entry's directory (repeatable)
    #[arg(short = 'r', long = "root", value_hint = clap::ValueHint::DirPath)]
    pub roots: Vec<PathBuf>,

    /// Static directory whose files are left alone (repeatable)
    #[arg(short = 's', long = "static", value_hint = clap::ValueHint::DirPath)]
    pub statics: Vec<PathBuf>,

    /// Minify stylesheets in staging
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_css: Option<bool>,

    /// Minify scripts in staging
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_js: Option<bool>,

    /// Write source maps for minified staging output
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sourcemaps: Option<bool>,

    /// Build only these modes (repeatable)
    #[arg(short, long = "mode", value_enum)]
    pub modes: Vec<BuildMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let cli = Cli::parse_from([
            "to-build", "build", "a.html", "b.html", "-r", "src", "-r", "lib", "-s", "public",
            "--minify-js", "false", "--mode", "production",
        ]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.entries, vec![PathBuf::from("a.html"), PathBuf::from("b.html")]);
        assert_eq!(build_args.roots.len(), 2);
        assert_eq!(build_args.statics, vec![PathBuf::from("public")]);
        assert_eq!(build_args.minify_js, Some(false));
        assert_eq!(build_args.minify_css, None);
        assert_eq!(build_args.modes, vec![BuildMode::Production]);
    }

    #[test]
    fn test_bare_flag_means_true() {
        let cli = Cli::parse_from(["to-build", "build", "--sourcemaps"]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.sourcemaps, Some(true));
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::parse_from(["to-build", "-V", "serve", "--interface", "0.0.0.0", "--no-build"]);
        assert!(cli.verbose);
        let Commands::Serve {
            interface,
            no_build,
            ..
        } = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
        assert!(no_build);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["to-build", "status", "-C", "site/to-build.toml"]);
        assert_eq!(cli.config, PathBuf::from("site/to-build.toml"));
        assert!(matches!(cli.command, Commands::Status));
    }
}
