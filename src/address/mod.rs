//! Multi-root file lookup.
//!
//! # Architecture
//!
//! ```text
//! "./css/a.css" ──► entry dir ──► roots... ──► package dir   (RootSet, first hit wins)
//!                        │ miss
//!                        ▼
//!                   StaticSet  (found: leave alone, else: missing-asset)
//! ```
//!
//! Both sets are explicit values built once per entry document; nothing here
//! is process-global.

mod resolve;

use std::path::{Path, PathBuf};

pub use resolve::{Lookup, Resolved, Resolver};

/// Ordered directories searched for a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet(Vec<PathBuf>);

impl RootSet {
    /// Root set for one entry document: its own directory, then the
    /// configured roots, then the package directory when it exists.
    pub fn for_entry(entry_dir: &Path, roots: &[PathBuf], packages: Option<&Path>) -> Self {
        let mut set = Self::default();
        set.push(entry_dir);
        for root in roots {
            set.push(root);
        }
        if let Some(packages) = packages.filter(|p| p.is_dir()) {
            set.push(packages);
        }
        set
    }

    /// Append a directory unless already present.
    pub fn push(&mut self, dir: &Path) {
        if !self.0.iter().any(|d| d == dir) {
            self.0.push(dir.to_path_buf());
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.0
    }
}

/// Directories already served elsewhere; matches are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSet(Vec<PathBuf>);

impl StaticSet {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut set = Self::default();
        for dir in dirs {
            if !set.0.contains(&dir) {
                set.0.push(dir);
            }
        }
        set
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.0
    }
}

/// Resolver over a root set and a static set.
pub fn resolver<'a>(roots: &'a RootSet, statics: &'a StaticSet) -> Resolver<'a> {
    Resolver::new(roots.dirs(), statics.dirs())
}
