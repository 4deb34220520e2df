//! The entity record: one discovered reference to one asset file.

use std::ops::Range;
use std::path::{Path, PathBuf};

use super::{Category, TagId};
use crate::address::Resolved;
use crate::utils::path::{decode_path, split_suffix};

/// A registered asset reference.
///
/// Identity fields (`tag_id`, `original_uri`, the matched `tag`) never change
/// after registration. The transform fills [`Entity::target`] once per pass.
#[derive(Debug, Clone)]
pub struct Entity {
    pub tag_id: TagId,
    /// Raw matched markup.
    pub tag: String,
    /// Byte range of the reference inside `tag`.
    pub uri_span: Range<usize>,
    /// Reference as currently written (relative once rewritten).
    pub uri: String,
    pub original_uri: String,
    /// Percent-decoded path portion of the reference.
    pub pathname: String,
    /// `?query#fragment` carried over to the rewritten reference.
    pub suffix: String,
    pub name: String,
    pub ext: String,
    pub base: String,
    pub dir: String,
    pub fullname: String,
    pub source_path: PathBuf,
    pub source_dir: PathBuf,
    pub root_folder: PathBuf,
    /// Entity whose text revealed this one (stylesheet or manifest).
    pub parent: Option<TagId>,
    pub replacement: String,
    pub target: Option<Target>,
}

/// Transform-derived data.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub name: String,
    /// Transformed content; `None` means copy the source verbatim.
    pub code: Option<String>,
    pub sourcemap_path: Option<PathBuf>,
    pub sourcemap_content: Option<String>,
    /// Uncompressed twin written beside a minified file for map consumers.
    pub uncompressed: Option<(PathBuf, String)>,
    /// Output already produced by an external tool; skip the write step.
    pub already_generated: bool,
    /// Deferred to the production coalescing pass.
    pub deferred: bool,
}

impl Target {
    pub fn at(path: PathBuf) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            dir,
            name,
            ..Self::default()
        }
    }
}

impl Entity {
    /// Build a fresh entity from a matched reference and its resolution.
    pub fn new(
        tag_id: TagId,
        tag: &str,
        uri_span: Range<usize>,
        resolved: Resolved,
        parent: Option<TagId>,
    ) -> Self {
        let uri = tag[uri_span.clone()].to_string();
        let (path, suffix) = split_suffix(&uri);
        let pathname = decode_path(path).into_owned();
        let suffix = suffix.to_string();

        let trimmed = pathname.trim_start_matches("./").trim_start_matches('/');
        let (dir, base) = match trimmed.rsplit_once('/') {
            Some((dir, base)) => (dir.to_string(), base.to_string()),
            None => (String::new(), trimmed.to_string()),
        };
        let (name, ext) = split_extension(&base);

        let source_dir = resolved
            .source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            tag_id,
            tag: tag.to_string(),
            uri_span,
            original_uri: uri.clone(),
            uri,
            suffix,
            fullname: trimmed.to_string(),
            pathname,
            name,
            ext,
            base,
            dir,
            source_path: resolved.source_path,
            source_dir,
            root_folder: resolved.root_folder,
            parent,
            replacement: tag_id.placeholder(),
            target: None,
        }
    }

    #[inline]
    pub const fn category(&self) -> Category {
        self.tag_id.category
    }

    /// The matched tag with only its reference replaced.
    pub fn rewritten_tag(&self, new_uri: &str) -> String {
        let mut out = String::with_capacity(self.tag.len() + new_uri.len());
        out.push_str(&self.tag[..self.uri_span.start]);
        out.push_str(new_uri);
        out.push_str(&self.tag[self.uri_span.end..]);
        out
    }

    /// Record transform output. Returns `false` if a target was already set.
    pub fn fill_target(&mut self, target: Target) -> bool {
        if self.target.is_some() {
            return false;
        }
        self.target = Some(target);
        true
    }

    /// Whether the source is a web app manifest.
    pub fn is_manifest(&self) -> bool {
        let base = self.base.to_ascii_lowercase();
        base == "manifest.json" || base.ends_with(".webmanifest")
    }
}

/// Split `a.min.css` into (`a.min`, `.css`); dotfiles keep their name.
fn split_extension(base: &str) -> (String, String) {
    match base.rfind('.') {
        Some(pos) if pos > 0 => (base[..pos].to_string(), base[pos..].to_string()),
        _ => (base.to_string(), String::new()),
    }
}
