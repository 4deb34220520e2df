//! Entity extraction: matched references become registered entities and
//! their tags are replaced by placeholders.

use std::path::Path;

use super::scan::{PatternSpec, Reference, find_css_urls, find_manifest_sources, find_references};
use crate::address::{Lookup, Resolver};
use crate::asset::{AssetError, AssetResult, Category, Entity, EntityRegistry, TagId};
use crate::{debug, report};

/// Result of one extraction pass over a text.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Input text with every registered tag replaced by its placeholder.
    pub text: String,
    /// Newly registered entities, in document order.
    pub found: Vec<TagId>,
    /// References that resolved nowhere (already reported).
    pub missing: usize,
}

/// Scans a text against a resolver and records what it finds.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    resolver: Resolver<'a>,
    /// File the scanned text came from, for error messages.
    from: &'a Path,
}

impl<'a> Extractor<'a> {
    pub const fn new(resolver: Resolver<'a>, from: &'a Path) -> Self {
        Self { resolver, from }
    }

    /// Extract every reference matching `spec` from a document.
    pub fn extract(
        &self,
        text: &str,
        spec: &PatternSpec,
        registry: &mut EntityRegistry,
    ) -> AssetResult<Extraction> {
        let refs = find_references(text, spec);
        self.substitute(text, &refs, spec.category, None, registry)
    }

    fn substitute(
        &self,
        text: &str,
        refs: &[Reference],
        category: Category,
        parent: Option<TagId>,
        registry: &mut EntityRegistry,
    ) -> AssetResult<Extraction> {
        let mut extraction = Extraction {
            text: String::with_capacity(text.len()),
            ..Extraction::default()
        };
        let mut cursor = 0;

        for reference in refs {
            let tag = reference.tag(text);
            let uri = &tag[reference.uri.clone()];
            extraction.text.push_str(&text[cursor..reference.range.start]);
            cursor = reference.range.end;

            match self.resolver.lookup(uri) {
                Lookup::Found(resolved) => {
                    let tag_id = registry.next_tag_id(category)?;
                    let entity = Entity::new(tag_id, tag, reference.uri.clone(), resolved, parent);
                    extraction.text.push_str(&entity.replacement);
                    extraction.found.push(registry.register(entity));
                }
                Lookup::Static(path) => {
                    debug!("extract"; "{uri} is static ({})", path.display());
                    extraction.text.push_str(tag);
                }
                Lookup::Skipped => extraction.text.push_str(tag),
                Lookup::Missing => {
                    let err = AssetError::Missing {
                        uri: uri.to_string(),
                        from: self.from.to_path_buf(),
                    };
                    report!(err.id(); "{err}");
                    extraction.missing += 1;
                    extraction.text.push_str(tag);
                }
            }
        }

        extraction.text.push_str(&text[cursor..]);
        Ok(extraction)
    }
}

/// Extract references found inside an asset's own text: `url()` in a
/// stylesheet, `"src"` fields in a manifest.
///
/// They resolve against the asset's directory only, never the document's
/// root set, and register as [`Category::Extras`] children of `parent`.
pub fn extract_nested(
    text: &str,
    parent: &Entity,
    registry: &mut EntityRegistry,
) -> AssetResult<Extraction> {
    let refs = if parent.is_manifest() {
        find_manifest_sources(text)
    } else {
        find_css_urls(text)
    };
    let extractor = Extractor::new(Resolver::nested(&parent.source_dir), &parent.source_path);
    extractor.substitute(text, &refs, Category::Extras, Some(parent.tag_id), registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Resolved;
    use crate::asset::DELIMITER;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn site() -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("css/img")).unwrap();
        fs::write(src.join("css/a.css"), "a{}").unwrap();
        fs::write(src.join("css/img/bg.png"), "png").unwrap();
        fs::write(src.join("b.js"), "b()").unwrap();
        (dir, vec![src])
    }

    #[test]
    fn test_extract_replaces_only_resolved_tags() {
        let (_dir, roots) = site();
        let from = roots[0].join("index.html");
        let extractor = Extractor::new(Resolver::new(&roots, &[]), &from);
        let mut registry = EntityRegistry::new();

        let html = r#"<head>
  <link rel="stylesheet" href="./css/a.css">
  <link rel="stylesheet" href="https://cdn.example.com/x.css">
  <link rel="stylesheet" href="nope.css">
</head>"#;
        let spec = PatternSpec::for_category(Category::Css).unwrap();
        let out = extractor.extract(html, &spec, &mut registry).unwrap();

        assert_eq!(out.found.len(), 1);
        assert_eq!(out.missing, 1);
        let placeholder = registry.get(out.found[0]).unwrap().replacement.clone();
        assert_eq!(
            out.text,
            html.replace(r#"<link rel="stylesheet" href="./css/a.css">"#, &placeholder)
        );
    }

    #[test]
    fn test_placeholders_not_rematched_by_later_passes() {
        let (_dir, roots) = site();
        let from = roots[0].join("index.html");
        let extractor = Extractor::new(Resolver::new(&roots, &[]), &from);
        let mut registry = EntityRegistry::new();

        let mut text = r#"<link rel="stylesheet" href="css/a.css"><script src="b.js"></script>"#
            .to_string();
        for category in Category::EXTRACTION_ORDER {
            let spec = PatternSpec::for_category(category).unwrap();
            text = extractor.extract(&text, &spec, &mut registry).unwrap().text;
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(text.matches(DELIMITER).count(), 4);
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_nested_css_urls_resolve_from_stylesheet_dir() {
        let (_dir, roots) = site();
        let css_path = roots[0].join("css/a.css");
        let mut registry = EntityRegistry::new();
        let tag = r#"<link rel="stylesheet" href="css/a.css">"#;
        let start = tag.find("css/a.css").unwrap();
        let parent = Entity::new(
            registry.next_tag_id(Category::Css).unwrap(),
            tag,
            start..start + 9,
            Resolved {
                root_folder: roots[0].clone(),
                source_path: css_path,
            },
            None,
        );
        registry.register(parent.clone());

        let css = "a{background:url(img/bg.png)}b{background:url(data:image/png;base64,AA)}";
        let out = extract_nested(css, &parent, &mut registry).unwrap();

        assert_eq!(out.found.len(), 1);
        let nested = registry.get(out.found[0]).unwrap();
        assert_eq!(nested.category(), Category::Extras);
        assert_eq!(nested.parent, Some(parent.tag_id));
        assert_eq!(nested.tag, "url(img/bg.png)");
        assert!(out.text.contains("url(data:image/png;base64,AA)"));
    }
}
