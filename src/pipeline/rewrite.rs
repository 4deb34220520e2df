//! Placeholder substitution: write an entity's output, then put its tag
//! back into the working text with a relative reference to that output.

use std::fs;
use std::path::Path;

use crate::asset::{AssetError, AssetResult, Entity};
use crate::utils::path::{ensure_dir, relative_url};

/// Write an entity's target (content, source map, uncompressed twin) or
/// copy its source verbatim. Generated targets are left untouched.
pub fn write_target(entity: &Entity) -> AssetResult<()> {
    let Some(target) = &entity.target else {
        return Ok(());
    };
    if target.already_generated {
        return Ok(());
    }

    ensure_dir(&target.dir).map_err(|e| AssetError::write(&target.dir, e))?;
    match &target.code {
        Some(code) => fs::write(&target.path, code).map_err(|e| AssetError::write(&target.path, e))?,
        None if entity.source_path != target.path => {
            fs::copy(&entity.source_path, &target.path)
                .map_err(|e| AssetError::write(&target.path, e))?;
        }
        None => {}
    }

    if let (Some(path), Some(content)) = (&target.sourcemap_path, &target.sourcemap_content) {
        fs::write(path, content).map_err(|e| AssetError::write(path, e))?;
    }
    if let Some((path, content)) = &target.uncompressed {
        fs::write(path, content).map_err(|e| AssetError::write(path, e))?;
    }
    Ok(())
}

/// Write the entity's output and substitute its placeholder in `text` with
/// the original tag pointing at the output, relative to `from_dir`.
///
/// An entity without a target gets its original tag back.
pub fn apply_changes_from_entity(
    entity: &Entity,
    text: &str,
    from_dir: &Path,
) -> AssetResult<String> {
    let Some(target) = &entity.target else {
        return Ok(restore_tag(entity, text));
    };
    write_target(entity)?;

    let uri = format!("{}{}", relative_url(from_dir, &target.path), entity.suffix);
    Ok(text.replace(&entity.replacement, &entity.rewritten_tag(&uri)))
}

/// Put the untouched original tag back in place of the placeholder.
pub fn restore_tag(entity: &Entity, text: &str) -> String {
    text.replace(&entity.replacement, &entity.tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Resolved;
    use crate::asset::{Category, TagId, Target};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entity(dir: &Path, tag: &str, uri: &str) -> Entity {
        let start = tag.find(uri).unwrap();
        Entity::new(
            TagId::new(Category::Media, 0).unwrap(),
            tag,
            start..start + uri.len(),
            Resolved {
                root_folder: dir.join("src"),
                source_path: dir.join("src/img/x.png"),
            },
            None,
        )
    }

    #[test]
    fn test_copy_and_rewrite_preserves_tag_bytes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/img")).unwrap();
        fs::write(dir.path().join("src/img/x.png"), "png").unwrap();

        let tag = r#"<img  class="hero" src="/img/x.png?v=2"  alt='x'>"#;
        let mut e = entity(dir.path(), tag, "/img/x.png?v=2");
        let out = dir.path().join("dist/staging");
        e.fill_target(Target::at(out.join("img/x.png")));

        let text = format!("<body>{}</body>", e.replacement);
        let rewritten = apply_changes_from_entity(&e, &text, &out).unwrap();

        assert_eq!(
            rewritten,
            r#"<body><img  class="hero" src="./img/x.png?v=2"  alt='x'></body>"#
        );
        assert_eq!(fs::read_to_string(out.join("img/x.png")).unwrap(), "png");
    }

    #[test]
    fn test_generated_target_skips_write() {
        let dir = TempDir::new().unwrap();
        let tag = r#"<img src="img/x.png">"#;
        let mut e = entity(dir.path(), tag, "img/x.png");
        let out = dir.path().join("out");
        e.fill_target(Target {
            already_generated: true,
            ..Target::at(out.join("x.bundle.js"))
        });

        let rewritten = apply_changes_from_entity(&e, &e.replacement.clone(), &out).unwrap();
        assert_eq!(rewritten, r#"<img src="./x.bundle.js">"#);
        assert!(!out.exists());
    }

    #[test]
    fn test_writes_map_and_twin() {
        let dir = TempDir::new().unwrap();
        let tag = r#"<img src="img/x.png">"#;
        let mut e = entity(dir.path(), tag, "img/x.png");
        let out = dir.path().join("out");
        e.fill_target(Target {
            code: Some("min".into()),
            sourcemap_path: Some(out.join("x.png.map")),
            sourcemap_content: Some("{}".into()),
            uncompressed: Some((out.join("x.png"), "full".into())),
            ..Target::at(out.join("x.min.png"))
        });

        write_target(&e).unwrap();
        write_target(&e).unwrap();
        assert_eq!(fs::read_to_string(out.join("x.min.png")).unwrap(), "min");
        assert_eq!(fs::read_to_string(out.join("x.png.map")).unwrap(), "{}");
        assert_eq!(fs::read_to_string(out.join("x.png")).unwrap(), "full");
    }

    #[test]
    fn test_missing_target_restores_tag() {
        let dir = TempDir::new().unwrap();
        let tag = r#"<img src="img/x.png">"#;
        let e = entity(dir.path(), tag, "img/x.png");
        let text = format!("a{}b", e.replacement);
        assert_eq!(
            apply_changes_from_entity(&e, &text, &PathBuf::from("/out")).unwrap(),
            format!("a{tag}b")
        );
    }
}
