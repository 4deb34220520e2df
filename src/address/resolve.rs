//! Reference lookup against the root and static sets.
//!
//! Lookup is "first existing match wins": callers order the root set so the
//! entry document's directory comes first, explicit roots next and the
//! package directory last.

use std::path::{Path, PathBuf};

use crate::utils::path::{clean_path, decode_path, is_external_link, is_fragment, split_suffix};

/// Where a reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The root directory that produced the match.
    pub root_folder: PathBuf,
    /// Absolute location of the source file.
    pub source_path: PathBuf,
}

/// Outcome of looking up one reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Found under a root; the asset gets registered.
    Found(Resolved),
    /// Found only in the static set; left alone on purpose.
    Static(PathBuf),
    /// External URL, bare fragment or empty reference.
    Skipped,
    /// Not found anywhere.
    Missing,
}

/// Resolves references against an ordered root set and a static set.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    roots: &'a [PathBuf],
    statics: &'a [PathBuf],
}

impl<'a> Resolver<'a> {
    pub const fn new(roots: &'a [PathBuf], statics: &'a [PathBuf]) -> Self {
        Self { roots, statics }
    }

    /// A resolver whose only root is `dir`, for references found inside an
    /// asset file (they resolve relative to that file, never the document).
    pub fn nested(dir: &'a PathBuf) -> Self {
        Self {
            roots: std::slice::from_ref(dir),
            statics: &[],
        }
    }

    /// Classify a raw reference string.
    pub fn lookup(&self, uri: &str) -> Lookup {
        let uri = uri.trim();
        if uri.is_empty() || is_fragment(uri) || is_external_link(uri) {
            return Lookup::Skipped;
        }

        let (path, _) = split_suffix(uri);
        let pathname = decode_path(path);
        if pathname.is_empty() {
            return Lookup::Skipped;
        }

        if let Some(found) = self.resolve(&pathname) {
            return Lookup::Found(found);
        }
        match self.resolve_static(&pathname) {
            Some(path) => Lookup::Static(path),
            None => Lookup::Missing,
        }
    }

    /// Find a decoded path on disk: a literal absolute file first, then each
    /// root in order.
    pub fn resolve(&self, pathname: &str) -> Option<Resolved> {
        let literal = Path::new(pathname);
        if literal.is_absolute() && literal.is_file() {
            let source_path = clean_path(literal);
            let root_folder = source_path.parent()?.to_path_buf();
            return Some(Resolved {
                root_folder,
                source_path,
            });
        }

        let relative = relative_part(pathname);
        self.roots.iter().find_map(|root| {
            let candidate = clean_path(&root.join(relative));
            candidate.is_file().then(|| Resolved {
                root_folder: root.clone(),
                source_path: candidate,
            })
        })
    }

    /// Find a decoded path in the static set only.
    pub fn resolve_static(&self, pathname: &str) -> Option<PathBuf> {
        let relative = relative_part(pathname);
        self.statics
            .iter()
            .map(|dir| clean_path(&dir.join(relative)))
            .find(|candidate| candidate.exists())
    }
}

/// Strip the site-root slash and any `./` so the path joins under a root.
fn relative_part(pathname: &str) -> &str {
    let mut rest = pathname.trim_start_matches('/');
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest
}
