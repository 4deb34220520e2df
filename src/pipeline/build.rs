//! Build orchestration: one pass per entry document, per mode.
//!
//! ```text
//! idle → extracting → transforming → rewriting → (production: coalescing) → written
//! ```
//!
//! Each pass gets its own root set and entity registry. A failing entity is
//! reported and skipped; a failing document is reported and the remaining
//! documents and modes still build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::{
    Extractor, PatternSpec, apply_changes_from_entity, build_production_targets, restore_tag,
    strip_directives,
};
use crate::address::{self, RootSet, StaticSet};
use crate::asset::{
    AssetError, Category, DELIMITER, EntityRegistry, Minifier, ModuleBundler, TagId,
    TransformContext, is_placeholder_safe, transform,
};
use crate::core::{BuildMode, BuildPhase, PhaseTracker, TransformFlags};
use crate::utils::path::{clean_path, ensure_dir, normalize_path, relative_url};
use crate::utils::plural_count;
use crate::{debug, log, report};

/// File written beside each mode's output when enabled.
pub const ASSET_MANIFEST: &str = "asset-manifest.json";

/// Typed settings the pipeline runs with, validated before any pass.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output root; modes write to `<output>/<mode>`.
    pub output: PathBuf,
    /// Entry documents are mirrored relative to this directory.
    pub base_dir: PathBuf,
    pub roots: Vec<PathBuf>,
    pub statics: Vec<PathBuf>,
    /// Lookup package directory, used only when it exists.
    pub packages: Option<PathBuf>,
    pub flags: TransformFlags,
    pub bundle_target: String,
    pub bundle_format: String,
    /// Write `asset-manifest.json` per mode.
    pub manifest: bool,
}

/// Outcome of one document pass.
#[derive(Debug, Clone, Default)]
pub struct DocumentReport {
    pub entry: PathBuf,
    /// Written HTML file.
    pub output: PathBuf,
    pub entities: usize,
    pub failed: usize,
    pub bundles: usize,
    /// Original reference → output path relative to the mode root.
    pub assets: Vec<(String, String)>,
}

/// Outcome of one mode over all entry documents.
#[derive(Debug, Clone)]
pub struct ModeReport {
    pub mode: BuildMode,
    pub root: PathBuf,
    pub documents: Vec<DocumentReport>,
    pub failed_documents: Vec<PathBuf>,
}

impl ModeReport {
    pub fn is_success(&self) -> bool {
        self.failed_documents.is_empty()
    }

    pub fn summary(&self) -> String {
        let sum = |f: fn(&DocumentReport) -> usize| self.documents.iter().map(f).sum::<usize>();
        let mut line = format!(
            "{} written, {} processed, {} failed, {}",
            plural_count(self.documents.len(), "document"),
            plural_count(sum(|d| d.entities), "asset"),
            sum(|d| d.failed),
            plural_count(sum(|d| d.bundles), "bundle"),
        );
        if !self.failed_documents.is_empty() {
            line.push_str(&format!(
                " ({} not built)",
                plural_count(self.failed_documents.len(), "document")
            ));
        }
        line
    }
}

/// Runs document passes with the given services.
pub struct Builder<'a> {
    options: &'a BuildOptions,
    minifier: &'a dyn Minifier,
    bundler: &'a dyn ModuleBundler,
}

impl<'a> Builder<'a> {
    pub fn new(
        options: &'a BuildOptions,
        minifier: &'a dyn Minifier,
        bundler: &'a dyn ModuleBundler,
    ) -> Self {
        Self {
            options,
            minifier,
            bundler,
        }
    }

    pub fn mode_root(&self, mode: BuildMode) -> PathBuf {
        self.options.output.join(mode.name())
    }

    /// Build every mode in order; `on_written` runs once per finished mode.
    pub fn build_all(
        &self,
        entries: &[PathBuf],
        modes: &[BuildMode],
        mut on_written: impl FnMut(&ModeReport),
    ) -> Vec<ModeReport> {
        modes
            .iter()
            .map(|&mode| {
                let report = self.build_mode(entries, mode);
                on_written(&report);
                report
            })
            .collect()
    }

    /// Build all entry documents for one mode and write its asset manifest.
    pub fn build_mode(&self, entries: &[PathBuf], mode: BuildMode) -> ModeReport {
        let mut report = ModeReport {
            mode,
            root: self.mode_root(mode),
            documents: Vec::with_capacity(entries.len()),
            failed_documents: Vec::new(),
        };

        for entry in entries {
            match self.build_document(entry, mode) {
                Ok(document) => report.documents.push(document),
                Err(err) => {
                    let id = err.downcast_ref::<AssetError>().map_or("build-failed", AssetError::id);
                    report!(id; "{}: {err:#}", entry.display());
                    report.failed_documents.push(entry.clone());
                }
            }
        }

        if self.options.manifest
            && !report.documents.is_empty()
            && let Err(err) = write_asset_manifest(&report)
        {
            report!("write-failed"; "{err:#}");
        }

        log!(mode.name(); "{}", report.summary());
        report
    }

    /// One pass over one entry document.
    pub fn build_document(&self, entry: &Path, mode: BuildMode) -> Result<DocumentReport> {
        let mut phases = PhaseTracker::new(mode);
        let entry = normalize_path(entry);
        let html = fs::read_to_string(&entry).map_err(|e| AssetError::read(&entry, e))?;
        if !is_placeholder_safe(&html) {
            return Err(AssetError::InvalidSource { path: entry }.into());
        }

        let mode_root = self.mode_root(mode);
        let output = self.output_path(&entry, &mode_root);
        let html_out_dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| mode_root.clone());
        let entry_dir = entry.parent().unwrap_or(Path::new("/"));

        let roots = RootSet::for_entry(entry_dir, &self.options.roots, self.options.packages.as_deref());
        let statics = StaticSet::new(self.options.statics.iter().cloned());
        let mut registry = EntityRegistry::new();
        let mut report = DocumentReport {
            entry: entry.clone(),
            output: output.clone(),
            ..DocumentReport::default()
        };
        debug!(mode.name(); "{} with roots {:?}", entry.display(), roots.dirs());

        // Extract
        phases.enter(BuildPhase::Extracting)?;
        let extractor = Extractor::new(address::resolver(&roots, &statics), &entry);
        let mut text = strip_directives(&html, mode);
        for category in Category::EXTRACTION_ORDER {
            let Some(spec) = PatternSpec::for_category(category) else {
                continue;
            };
            let extraction = extractor.extract(&text, &spec, &mut registry)?;
            report.failed += extraction.missing;
            text = extraction.text;
        }

        if registry.is_empty() {
            debug!(mode.name(); "no assets referenced by {}", entry.display());
        } else {
            debug!(mode.name(); "{} extracted", plural_count(registry.len(), "asset"));
        }
        ensure_dir(&html_out_dir).map_err(|e| AssetError::write(&html_out_dir, e))?;

        // Transform
        phases.enter(BuildPhase::Transforming)?;
        let cx = TransformContext {
            mode,
            flags: mode.flags(self.options.flags),
            html_out_dir: &html_out_dir,
            mode_root: &mode_root,
            minifier: self.minifier,
            bundler: self.bundler,
            bundle_target: &self.options.bundle_target,
            bundle_format: &self.options.bundle_format,
        };
        for category in Category::TRANSFORM_ORDER {
            for tag_id in registry.ids(category) {
                match transform(tag_id, &mut registry, &cx) {
                    Ok(outcome) => {
                        report.entities += 1 + outcome.nested;
                        report.failed += outcome.missing;
                    }
                    Err(err) if err.is_fatal_for_document() => return Err(err.into()),
                    Err(err) => {
                        report!(err.id(); "{err}");
                        report.failed += 1;
                    }
                }
            }
        }

        // Rewrite
        phases.enter(BuildPhase::Rewriting)?;
        for category in Category::TRANSFORM_ORDER {
            for tag_id in registry.ids(category) {
                if registry.deferred(tag_id).is_some() {
                    continue;
                }
                if let Some(entity) = registry.get(tag_id) {
                    text = apply_changes_from_entity(entity, &text, &html_out_dir)?;
                }
            }
        }

        // Coalesce
        let mut bundled: FxHashMap<TagId, PathBuf> = FxHashMap::default();
        if mode.is_production() {
            phases.enter(BuildPhase::Coalescing)?;
            let coalesced = build_production_targets(&text, &registry, &html_out_dir)?;
            report.bundles = coalesced.bundles.len();
            for bundle in coalesced.bundles {
                for member in bundle.members {
                    bundled.insert(member, bundle.path.clone());
                }
            }
            text = coalesced.text;
        }

        if text.contains(DELIMITER) {
            for entity in registry.iter() {
                text = restore_tag(entity, &text);
            }
        }

        fs::write(&output, &text).map_err(|e| AssetError::write(&output, e))?;
        phases.enter(BuildPhase::Written)?;

        report.assets = registry
            .iter()
            .filter_map(|entity| {
                let path = bundled
                    .get(&entity.tag_id)
                    .or(entity.target.as_ref().map(|t| &t.path))?;
                Some((entity.original_uri.clone(), relative_url(&mode_root, path)))
            })
            .collect();
        debug!(mode.name(); "wrote {}", output.display());
        Ok(report)
    }

    /// `<output>/<mode>/<entry relative to the base dir>`.
    fn output_path(&self, entry: &Path, mode_root: &Path) -> PathBuf {
        let base_dir = normalize_path(&self.options.base_dir);
        let relative = entry
            .strip_prefix(&base_dir)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| entry.file_name().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("index.html"));
        let path = clean_path(&mode_root.join(relative));
        if path.starts_with(mode_root) {
            path
        } else {
            mode_root.join(entry.file_name().unwrap_or_default())
        }
    }
}

/// Write `<mode root>/asset-manifest.json`: per document, every processed
/// reference and where it ended up, in discovery order.
fn write_asset_manifest(report: &ModeReport) -> Result<()> {
    let mut documents = Map::new();
    for document in &report.documents {
        let assets: Map<String, Value> = document
            .assets
            .iter()
            .map(|(uri, path)| (uri.clone(), Value::String(path.clone())))
            .collect();
        documents.insert(
            relative_url(&report.root, &document.output),
            Value::Object(assets),
        );
    }

    let path = report.root.join(ASSET_MANIFEST);
    let json = serde_json::to_string_pretty(&Value::Object(documents))?;
    fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
