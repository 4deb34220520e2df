//! Configuration management for `to-build.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── bundler    # [bundler]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The file is optional. Without one, defaults apply with the current
//! directory as project root. Command-line values override file values,
//! and the validated [`Config`] is the only configuration the pipeline sees.

pub mod section;
pub mod types;
mod util;

use util::{absolute_from, find_config_file};

pub use section::{BuildSectionConfig, BundlerConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::pipeline::BuildOptions;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name looked up when `-C` is not given.
pub const DEFAULT_CONFIG: &str = "to-build.toml";

/// Entry document used when none is named on the command line.
const DEFAULT_ENTRY: &str = "index.html";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing to-build.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root: the config file's directory, else the current directory
    #[serde(skip)]
    pub root: PathBuf,

    pub build: BuildSectionConfig,
    pub bundler: BundlerConfig,
    pub serve: ServeConfig,
}

impl Config {
    /// Load configuration for the parsed command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    /// Load configuration as if the process ran in `cwd`.
    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let mut config = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                return Err(ConfigError::Io(
                    cli.config.clone(),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                )
                .into());
            }
            None => Self {
                root: cwd.to_path_buf(),
                ..Self::default()
            },
        };

        match &config.config_path {
            Some(path) => debug!("config"; "using {}", path.display()),
            None => debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG),
        }

        config.finalize(cli, cwd);
        config.validate()?;
        config.build.filter_existing_dirs();
        Ok(config)
    }

    /// Normalize file paths, then layer command-line values on top.
    fn finalize(&mut self, cli: &Cli, cwd: &Path) {
        let root = crate::utils::path::normalize_path(&self.root);
        self.build.normalize(&root);
        self.root = root;
        self.apply_command_options(cli, cwd);

        if self.build.entries.is_empty() {
            self.build.entries.push(cwd.join(DEFAULT_ENTRY));
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args, cwd),
            Commands::Serve {
                build_args,
                interface,
                ..
            } => {
                self.apply_build_args(build_args, cwd);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
            }
            Commands::Status => {}
        }
    }

    /// Apply build arguments from CLI. Paths given there are relative to `cwd`.
    fn apply_build_args(&mut self, args: &BuildArgs, cwd: &Path) {
        let from_cwd = |p: &PathBuf| absolute_from(cwd, p);

        self.build.entries = args.entries.iter().map(from_cwd).collect();
        if let Some(output) = &args.output {
            self.build.output = from_cwd(output);
        }
        if !args.roots.is_empty() {
            self.build.roots = args.roots.iter().map(from_cwd).collect();
        }
        if !args.statics.is_empty() {
            self.build.statics = args.statics.iter().map(from_cwd).collect();
        }
        if !args.modes.is_empty() {
            self.build.modes = args.modes.clone();
        }

        Self::update_option(&mut self.build.minify_css, args.minify_css.as_ref());
        Self::update_option(&mut self.build.minify_js, args.minify_js.as_ref());
        Self::update_option(&mut self.build.sourcemaps, args.sourcemaps.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the merged configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.bundler.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    // ========================================================================
    // pipeline view
    // ========================================================================

    /// Typed options for the build pipeline.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            output: self.build.output.clone(),
            base_dir: self.root.clone(),
            roots: self.build.roots.clone(),
            statics: self.build.statics.clone(),
            packages: self.build.existing_packages(),
            flags: self.build.flags(),
            bundle_target: self.bundler.target.clone(),
            bundle_format: self.bundler.format.clone(),
            manifest: self.build.manifest,
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
