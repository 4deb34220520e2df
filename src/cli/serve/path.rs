//! URL to filesystem path resolution.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Where a request was answered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    /// Found under a dynamic (source) directory.
    pub dynamic: bool,
}

/// Search `dynamic_dirs` then `dirs`; the first match wins.
pub fn locate(url: &str, dynamic_dirs: &[PathBuf], dirs: &[PathBuf]) -> Option<Located> {
    let tagged = dynamic_dirs
        .iter()
        .map(|dir| (dir, true))
        .chain(dirs.iter().map(|dir| (dir, false)));

    for (dir, dynamic) in tagged {
        if let Some(path) = resolve_path(url, dir) {
            return Some(Located { path, dynamic });
        }
    }
    None
}

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject parent components early
    if Path::new(&clean)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: strip query string and fragment, decode, trim slashes
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
