//! Per-category transform dispatch.
//!
//! | Category                 | Staging target            | Production target          |
//! |--------------------------|---------------------------|----------------------------|
//! | Css, Script              | `<name>.min<ext>` + map   | `<hash><ext>`, deferred    |
//! | Esm                      | `<name>.bundle.js`        | `<hash>.js`                |
//! | Generic, Media, Extras   | mirrored copy             | mirrored copy              |
//!
//! Staging targets mirror the source's place under its root. Production
//! stylesheets and scripts are never written individually: the coalescing
//! pass bundles their code.

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    AssetError, AssetResult, BundleRequest, Category, Entity, EntityRegistry, Minified, Minifier,
    ModuleBundler, TagId, Target, is_placeholder_safe,
};
use crate::core::{BuildMode, TransformFlags};
use crate::debug;
use crate::pipeline::{apply_changes_from_entity, extract_nested};
use crate::utils::hash::ContentHash;
use crate::utils::path::{clean_path, ensure_dir};

/// Everything a transform needs besides the registry.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub mode: BuildMode,
    pub flags: TransformFlags,
    /// Directory the rewritten document is written to.
    pub html_out_dir: &'a Path,
    /// `<output>/<mode>`; targets never leave it.
    pub mode_root: &'a Path,
    pub minifier: &'a dyn Minifier,
    pub bundler: &'a dyn ModuleBundler,
    pub bundle_target: &'a str,
    pub bundle_format: &'a str,
}

/// Nested references handled while transforming one entity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformReport {
    pub nested: usize,
    pub missing: usize,
}

/// Transform one registered entity and fill its target.
///
/// Production stylesheets and scripts are deferred to the coalescing pass.
pub fn transform(
    tag_id: TagId,
    registry: &mut EntityRegistry,
    cx: &TransformContext<'_>,
) -> AssetResult<TransformReport> {
    let Some(entity) = registry.get(tag_id).cloned() else {
        return Ok(TransformReport::default());
    };

    let mut report = TransformReport::default();
    let target = match entity.category() {
        Category::Css => transform_css(&entity, registry, cx, &mut report)?,
        Category::Script => transform_script(&entity, cx)?,
        Category::Esm => transform_module(&entity, cx)?,
        Category::Generic | Category::Media | Category::Extras => {
            transform_copy(&entity, registry, cx, &mut report)?
        }
    };

    let deferred = target.deferred;
    if let Some(slot) = registry.get_mut(tag_id)
        && !slot.fill_target(target)
    {
        debug!("transform"; "{tag_id} already has a target");
    }
    if deferred {
        registry.defer(tag_id);
    }
    Ok(report)
}

fn transform_css(
    entity: &Entity,
    registry: &mut EntityRegistry,
    cx: &TransformContext<'_>,
    report: &mut TransformReport,
) -> AssetResult<Target> {
    let source = read_source(entity)?;
    let target_dir = code_target_dir(entity, cx);
    let text = rewrite_nested(&source, entity, &target_dir, registry, cx, report)?;

    finish_code(entity, text, &target_dir, cx, cx.flags.minify_css, |m, src, name, map| {
        m.minify_css(src, name, map)
    })
}

fn transform_script(entity: &Entity, cx: &TransformContext<'_>) -> AssetResult<Target> {
    let source = read_source(entity)?;
    let target_dir = code_target_dir(entity, cx);

    finish_code(entity, source, &target_dir, cx, cx.flags.minify_js, |m, src, name, map| {
        m.minify_js(src, name, map)
    })
}

/// Bundle an ES module with the external bundler. The bundler writes the
/// output itself, so the target is marked as already generated.
fn transform_module(entity: &Entity, cx: &TransformContext<'_>) -> AssetResult<Target> {
    let production = cx.mode.is_production();
    let out_dir = if production {
        cx.html_out_dir.to_path_buf()
    } else {
        parent_dir(&mirror_path(entity, cx))
    };
    let bundle_path = out_dir.join(format!("{}.bundle.js", entity.name));

    ensure_dir(&out_dir).map_err(|e| AssetError::write(&out_dir, e))?;
    cx.bundler
        .bundle(&BundleRequest {
            input: &entity.source_path,
            output: &bundle_path,
            target: cx.bundle_target,
            format: cx.bundle_format,
            sourcemap: cx.flags.sourcemaps,
            minify: cx.flags.minify_js,
        })
        .map_err(|message| AssetError::Bundle {
            path: entity.source_path.clone(),
            message,
        })?;

    let path = if production {
        let bytes = fs::read(&bundle_path).map_err(|e| AssetError::read(&bundle_path, e))?;
        let hashed = out_dir.join(ContentHash::of(&bytes).file_name(".js"));
        fs::rename(&bundle_path, &hashed).map_err(|e| AssetError::write(&hashed, e))?;
        hashed
    } else {
        bundle_path
    };

    Ok(Target {
        already_generated: true,
        ..Target::at(path)
    })
}

/// Verbatim copy to the mirrored location. Manifests get their `src`
/// fields rebased first.
fn transform_copy(
    entity: &Entity,
    registry: &mut EntityRegistry,
    cx: &TransformContext<'_>,
    report: &mut TransformReport,
) -> AssetResult<Target> {
    let path = mirror_path(entity, cx);
    if !entity.is_manifest() {
        return Ok(Target::at(path));
    }

    let source = read_source(entity)?;
    let text = rewrite_nested(&source, entity, &parent_dir(&path), registry, cx, report)?;
    Ok(Target {
        code: Some(text),
        ..Target::at(path)
    })
}

/// Extract, copy and rebase the references inside an asset's text so they
/// point from `target_dir` (where the asset is written) at their copies.
fn rewrite_nested(
    source: &str,
    parent: &Entity,
    target_dir: &Path,
    registry: &mut EntityRegistry,
    cx: &TransformContext<'_>,
    report: &mut TransformReport,
) -> AssetResult<String> {
    let extraction = extract_nested(source, parent, registry)?;
    report.missing += extraction.missing;

    let anchor = parent_dir(&mirror_path(parent, cx));
    let mut text = extraction.text;
    for tag_id in extraction.found {
        let Some(nested) = registry.get_mut(tag_id) else {
            continue;
        };
        let path = within_mode_root(clean_path(&anchor.join(&nested.fullname)), nested, cx);
        nested.fill_target(Target::at(path));

        text = apply_changes_from_entity(nested, &text, target_dir)?;
        report.nested += 1;
    }
    Ok(text)
}

/// Minify (or not) a stylesheet or script and name its target.
fn finish_code<F>(
    entity: &Entity,
    code: String,
    target_dir: &Path,
    cx: &TransformContext<'_>,
    minify: bool,
    run: F,
) -> AssetResult<Target>
where
    F: Fn(&dyn Minifier, &str, &str, bool) -> Result<Minified, String>,
{
    let minify_err = |message| AssetError::Minify {
        path: entity.source_path.clone(),
        message,
    };
    let ext = if entity.ext.is_empty() {
        entity.category().bundle_ext().unwrap_or_default()
    } else {
        entity.ext.as_str()
    };

    if cx.mode.is_production() && entity.category().is_coalesced() {
        let code = if minify {
            run(cx.minifier, &code, &entity.base, false)
                .map_err(minify_err)?
                .code
        } else {
            code
        };
        let path = target_dir.join(ContentHash::of(&code).file_name(ext));
        return Ok(Target {
            code: Some(code),
            deferred: true,
            ..Target::at(path)
        });
    }

    if !minify {
        return Ok(Target {
            code: Some(code),
            ..Target::at(target_dir.join(&entity.base))
        });
    }

    let minified = run(cx.minifier, &code, &entity.base, cx.flags.sourcemaps).map_err(minify_err)?;
    let mut target = Target::at(target_dir.join(format!("{}.min{ext}", entity.name)));
    target.code = Some(match minified.map {
        Some(map) => {
            let map_name = format!("{}.map", entity.base);
            target.sourcemap_path = Some(target_dir.join(&map_name));
            target.sourcemap_content = Some(map);
            target.uncompressed = Some((target_dir.join(&entity.base), code));
            format!("{}\n{}", minified.code, source_mapping_comment(entity.category(), &map_name))
        }
        None => minified.code,
    });
    Ok(target)
}

fn source_mapping_comment(category: Category, map_name: &str) -> String {
    match category {
        Category::Css => format!("/*# sourceMappingURL={map_name} */"),
        _ => format!("//# sourceMappingURL={map_name}"),
    }
}

/// Read an asset's text, rejecting anything that could corrupt placeholders.
fn read_source(entity: &Entity) -> AssetResult<String> {
    let text = fs::read_to_string(&entity.source_path)
        .map_err(|e| AssetError::read(&entity.source_path, e))?;
    if !is_placeholder_safe(&text) {
        return Err(AssetError::InvalidSource {
            path: entity.source_path.clone(),
        });
    }
    Ok(text)
}

/// Staging code lives beside its mirrored source; production code is
/// bundled next to the document.
fn code_target_dir(entity: &Entity, cx: &TransformContext<'_>) -> PathBuf {
    if cx.mode.is_production() {
        cx.html_out_dir.to_path_buf()
    } else {
        parent_dir(&mirror_path(entity, cx))
    }
}

/// Where a source lands when its place under its root is kept.
fn mirror_path(entity: &Entity, cx: &TransformContext<'_>) -> PathBuf {
    let path = match entity.source_path.strip_prefix(&entity.root_folder) {
        Ok(rel) => clean_path(&cx.html_out_dir.join(rel)),
        Err(_) => cx.html_out_dir.join(&entity.base),
    };
    within_mode_root(path, entity, cx)
}

fn within_mode_root(path: PathBuf, entity: &Entity, cx: &TransformContext<'_>) -> PathBuf {
    if path.starts_with(cx.mode_root) {
        return path;
    }
    let err = AssetError::BadTarget { path };
    debug!("transform"; "{}: {err}, using document dir", err.id());
    cx.html_out_dir.join(&entity.base)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
