//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"                 # Output root; each mode writes to <output>/<mode>
//! roots = ["src", "assets"]       # Lookup roots, searched after the entry's directory
//! statics = ["public"]            # Served as-is; references into them are left alone
//! packages = "node_modules"       # Searched last, only when it exists
//! minify_css = true
//! minify_js = true
//! sourcemaps = true               # Staging only; production never emits maps
//! modes = ["staging", "production"]
//! manifest = true                 # Write asset-manifest.json per mode
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::util::absolute_from;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::{BuildMode, TransformFlags};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Entry documents (CLI only).
    #[serde(skip)]
    pub entries: Vec<PathBuf>,

    pub output: PathBuf,
    pub roots: Vec<PathBuf>,
    pub statics: Vec<PathBuf>,
    pub packages: PathBuf,

    pub minify_css: bool,
    pub minify_js: bool,
    pub sourcemaps: bool,

    /// Modes built by `build` and `serve`, in order.
    pub modes: Vec<BuildMode>,

    /// Write an asset manifest per mode.
    pub manifest: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            output: "dist".into(),
            roots: Vec::new(),
            statics: Vec::new(),
            packages: "node_modules".into(),
            minify_css: true,
            minify_js: true,
            sourcemaps: true,
            modes: BuildMode::BUILT.to_vec(),
            manifest: true,
        }
    }
}

impl BuildSectionConfig {
    pub const fn flags(&self) -> TransformFlags {
        TransformFlags {
            minify_css: self.minify_css,
            minify_js: self.minify_js,
            sourcemaps: self.sourcemaps,
        }
    }

    /// Package directory, if it exists on disk.
    pub fn existing_packages(&self) -> Option<PathBuf> {
        self.packages.is_dir().then(|| self.packages.clone())
    }

    /// Validate build configuration.
    ///
    /// Missing roots and statics are only warned about.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.modes.is_empty() {
            diag.error_with_hint(
                FieldPath::new("build.modes"),
                "no build mode selected",
                "use `staging`, `production` or both",
            );
        }
        if self.modes.contains(&BuildMode::Development) {
            diag.error_with_hint(
                FieldPath::new("build.modes"),
                "`development` has no build output",
                "the development server serves the roots directly",
            );
        }

        warn_missing(FieldPath::new("build.roots"), &self.roots, diag);
        warn_missing(FieldPath::new("build.statics"), &self.statics, diag);
    }

    /// Drop roots and statics that do not exist.
    ///
    /// Call after validate() so the dropped paths were reported.
    pub fn filter_existing_dirs(&mut self) {
        self.roots.retain(|p| p.is_dir());
        self.statics.retain(|p| p.is_dir());
    }

    pub fn normalize(&mut self, root: &Path) {
        let join = |p: &Path| absolute_from(root, p);
        self.output = join(&self.output);
        self.packages = join(&self.packages);
        self.roots = self.roots.iter().map(|p| join(p)).collect();
        self.statics = self.statics.iter().map(|p| join(p)).collect();
        self.dedup_modes();
    }

    fn dedup_modes(&mut self) {
        let mut seen = Vec::with_capacity(self.modes.len());
        self.modes.retain(|mode| {
            let first = !seen.contains(mode);
            seen.push(*mode);
            first
        });
    }
}

fn warn_missing(field: FieldPath, dirs: &[PathBuf], diag: &mut ConfigDiagnostics) {
    for dir in dirs.iter().filter(|p| !p.is_dir()) {
        diag.warn(field, format!("directory '{}' not found, skipping", dir.display()));
    }
}
