//! Production coalescing: contiguous deferred stylesheets or scripts become
//! one content-addressed bundle.
//!
//! ```text
//! <head>␞css(0)␞\n  ␞css(1)␞␞script(0)␞</head>
//!        └──── one .css bundle ───┘└ .js ┘
//! ```
//!
//! Whitespace between two placeholders of the same category does not break
//! a run; any other text, a placeholder of another category, or a
//! placeholder that was not deferred flushes it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::asset::{
    AssetError, AssetResult, Category, DELIMITER, Entity, EntityRegistry, Segment, TagId, segments,
};
use crate::utils::hash::ContentHash;
use crate::utils::path::{ensure_dir, relative_url};

/// One written bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub category: Category,
    pub path: PathBuf,
    /// Entities concatenated into the bundle, in document order.
    pub members: Vec<TagId>,
}

/// Working text after coalescing, plus the bundles that were written.
#[derive(Debug, Default)]
pub struct Coalesced {
    pub text: String,
    pub bundles: Vec<Bundle>,
}

/// Replace every run of deferred placeholders with a single bundle tag.
///
/// Segments are processed strictly in document order, so bundle content and
/// therefore bundle names are deterministic.
pub fn build_production_targets(
    text: &str,
    registry: &EntityRegistry,
    out_dir: &Path,
) -> AssetResult<Coalesced> {
    let mut coalescer = Coalescer {
        out_dir,
        out: Coalesced {
            text: String::with_capacity(text.len()),
            bundles: Vec::new(),
        },
        run: Vec::new(),
        gap: String::new(),
    };

    for segment in segments(text) {
        match segment {
            Segment::Tag(tag_id) => match registry.deferred(tag_id) {
                Some(entity) => coalescer.push(entity)?,
                None => {
                    coalescer.flush()?;
                    coalescer.out.text.push_str(&tag_id.placeholder());
                }
            },
            Segment::Text(text) if !coalescer.run.is_empty() && text.trim().is_empty() => {
                coalescer.gap.push_str(text);
            }
            Segment::Text(text) => {
                coalescer.flush()?;
                coalescer.out.text.push_str(text);
            }
            Segment::Unknown(body) => {
                coalescer.flush()?;
                let text = &mut coalescer.out.text;
                text.push(DELIMITER);
                text.push_str(body);
                text.push(DELIMITER);
            }
        }
    }
    coalescer.flush()?;
    Ok(coalescer.out)
}

struct Coalescer<'a, 'r> {
    out_dir: &'a Path,
    out: Coalesced,
    run: Vec<&'r Entity>,
    /// Whitespace seen since the last run member.
    gap: String,
}

impl<'r> Coalescer<'_, 'r> {
    fn push(&mut self, entity: &'r Entity) -> AssetResult<()> {
        let continues = self
            .run
            .first()
            .is_some_and(|first| first.category() == entity.category());
        if continues {
            self.gap.clear();
        } else {
            self.flush()?;
        }
        self.run.push(entity);
        Ok(())
    }

    /// Write the pending run (if any) and emit its tag, then any held gap.
    fn flush(&mut self) -> AssetResult<()> {
        if let Some(first) = self.run.first() {
            let category = first.category();
            let bundle = write_bundle(category, &self.run, self.out_dir)?;
            let uri = relative_url(self.out_dir, &bundle.path);
            self.out.text.push_str(&bundle_tag(category, &uri));
            self.out.bundles.push(bundle);
            self.run.clear();
        }
        self.out.text.push_str(&self.gap);
        self.gap.clear();
        Ok(())
    }
}

/// Concatenate a run, name it by its hash and write it.
fn write_bundle(category: Category, run: &[&Entity], out_dir: &Path) -> AssetResult<Bundle> {
    let mut content = String::new();
    for entity in run {
        let code = match entity.target.as_ref().and_then(|t| t.code.as_deref()) {
            Some(code) => code.to_string(),
            None => fs::read_to_string(&entity.source_path)
                .map_err(|e| AssetError::read(&entity.source_path, e))?,
        };
        content.push_str(&format!("/* {} */\n", entity.original_uri.replace("*/", "*\\/")));
        content.push_str(&code);
        if !code.ends_with('\n') {
            content.push('\n');
        }
    }

    let ext = category.bundle_ext().unwrap_or_default();
    let path = out_dir.join(ContentHash::of(&content).file_name(ext));
    ensure_dir(out_dir).map_err(|e| AssetError::write(out_dir, e))?;
    fs::write(&path, &content).map_err(|e| AssetError::write(&path, e))?;

    Ok(Bundle {
        category,
        path,
        members: run.iter().map(|e| e.tag_id).collect(),
    })
}

fn bundle_tag(category: Category, uri: &str) -> String {
    match category {
        Category::Css => format!(r#"<link rel="stylesheet" href="{uri}">"#),
        _ => format!(r#"<script src="{uri}"></script>"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Resolved;
    use crate::asset::Target;
    use tempfile::TempDir;

    fn defer(registry: &mut EntityRegistry, category: Category, uri: &str, code: &str) -> String {
        let tag = format!(r#"<x src="{uri}">"#);
        let start = tag.find(uri).unwrap();
        let mut entity = Entity::new(
            registry.next_tag_id(category).unwrap(),
            &tag,
            start..start + uri.len(),
            Resolved {
                root_folder: PathBuf::from("/src"),
                source_path: PathBuf::from("/src").join(uri),
            },
            None,
        );
        entity.fill_target(Target {
            code: Some(code.to_string()),
            deferred: true,
            ..Target::default()
        });
        let placeholder = entity.replacement.clone();
        let tag_id = registry.register(entity);
        registry.defer(tag_id);
        placeholder
    }

    #[test]
    fn test_contiguous_run_is_one_bundle() {
        let dir = TempDir::new().unwrap();
        let mut registry = EntityRegistry::new();
        let a = defer(&mut registry, Category::Css, "a.css", "a{}");
        let b = defer(&mut registry, Category::Css, "b.css", "b{}");
        let text = format!("<head>\n  {a}\n  {b}\n</head>");

        let out = build_production_targets(&text, &registry, dir.path()).unwrap();
        assert_eq!(out.bundles.len(), 1);
        let bundle = &out.bundles[0];
        assert_eq!(bundle.members.len(), 2);

        let name = bundle.path.file_name().unwrap().to_str().unwrap();
        assert_eq!(
            out.text,
            format!("<head>\n  <link rel=\"stylesheet\" href=\"./{name}\">\n</head>")
        );
        let content = fs::read_to_string(&bundle.path).unwrap();
        assert_eq!(content, "/* a.css */\na{}\n/* b.css */\nb{}\n");
        assert_eq!(name, ContentHash::of(&content).file_name(".css"));
    }

    #[test]
    fn test_category_change_flushes() {
        let dir = TempDir::new().unwrap();
        let mut registry = EntityRegistry::new();
        let a = defer(&mut registry, Category::Css, "a.css", "a{}");
        let s = defer(&mut registry, Category::Script, "s.js", "s()");
        let b = defer(&mut registry, Category::Css, "b.css", "b{}");
        let text = format!("{a}{s}{b}");

        let out = build_production_targets(&text, &registry, dir.path()).unwrap();
        let categories: Vec<_> = out.bundles.iter().map(|b| b.category).collect();
        assert_eq!(categories, vec![Category::Css, Category::Script, Category::Css]);
        assert!(!out.text.contains(DELIMITER));
        assert_eq!(out.text.matches("<link").count(), 2);
        assert_eq!(out.text.matches("<script").count(), 1);
    }

    #[test]
    fn test_markup_between_placeholders_flushes() {
        let dir = TempDir::new().unwrap();
        let mut registry = EntityRegistry::new();
        let a = defer(&mut registry, Category::Script, "a.js", "a()");
        let b = defer(&mut registry, Category::Script, "b.js", "b()");
        let text = format!("{a}<p>between</p>{b}");

        let out = build_production_targets(&text, &registry, dir.path()).unwrap();
        assert_eq!(out.bundles.len(), 2);
        assert!(out.text.contains("</script><p>between</p><script"));
    }

    #[test]
    fn test_undeferred_placeholder_left_alone() {
        let dir = TempDir::new().unwrap();
        let registry = EntityRegistry::new();
        let stray = TagId::new(Category::Media, 7).unwrap().placeholder();
        let text = format!("<p>{stray}</p>");

        let out = build_production_targets(&text, &registry, dir.path()).unwrap();
        assert_eq!(out.text, text);
        assert!(out.bundles.is_empty());
    }

    #[test]
    fn test_identical_content_identical_name() {
        let build = |code: &str| {
            let dir = TempDir::new().unwrap();
            let mut registry = EntityRegistry::new();
            let a = defer(&mut registry, Category::Css, "a.css", code);
            let out = build_production_targets(&a, &registry, dir.path()).unwrap();
            out.bundles[0].path.file_name().unwrap().to_owned()
        };
        assert_eq!(build("a{color:red}"), build("a{color:red}"));
        assert_ne!(build("a{color:red}"), build("a{color:tan}"));
    }
}
