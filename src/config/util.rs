//! Configuration utility functions.

use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/pages/blog/   ← start
/// /home/user/site/to-build.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Tilde-expand `path` and make it absolute relative to `root`.
pub fn absolute_from(root: &Path, path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    normalize_path(&full_path)
}

// ============================================================================
// tests
// ============================================================================
