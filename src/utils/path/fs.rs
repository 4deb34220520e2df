//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `clean_path` - lexical `.`/`..` folding without touching the disk
//! - `relative_url` - relative, forward-slash reference from one directory to a file
//! - `ensure_dir` - idempotent directory creation

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Bytes escaped in a URL path segment: everything but RFC 3986 unreserved.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean_path(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| path.to_path_buf(), |cwd| clean_path(&cwd.join(path)))
        }
    })
}

/// Fold `.` and `..` components lexically.
///
/// `..` at the root of an absolute path is dropped; on a relative path it is kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Compute a relative URL from `from_dir` to `target`.
///
/// Both paths should be absolute. The result always uses `/` separators and
/// always starts with `./` or `../`, so it can never be mistaken for a
/// site-root reference. Each segment is percent-encoded, so the result is a
/// valid URL even when a file name holds spaces or parentheses.
///
/// # Example
/// ```ignore
/// relative_url(Path::new("/out/site"), Path::new("/out/site/css/a.css")) // "./css/a.css"
/// relative_url(Path::new("/out/site/css"), Path::new("/out/site/img/x.png")) // "../img/x.png"
/// ```
pub fn relative_url(from_dir: &Path, target: &Path) -> String {
    let from = clean_path(from_dir);
    let to = clean_path(target);

    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".into());
    }
    for part in &to_parts[common..] {
        let part = part.as_os_str().to_string_lossy();
        segments.push(utf8_percent_encode(&part, SEGMENT).to_string());
    }

    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Create a directory (and parents) if it does not exist yet.
///
/// Safe to call repeatedly for the same path; existing contents are untouched.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
}
