//! Document pipeline.
//!
//! # Architecture
//!
//! ```text
//! HTML ──► directive ──► extract ──► transform ──► rewrite ──► coalesce ──► HTML
//!          (strip)     (placeholders) (asset::)   (relative)  (production)
//! ```
//!
//! - [`scan`]: regex tag matching behind [`find_references`]
//! - [`extract`]: entity registration and placeholder substitution
//! - [`rewrite`]: output writing and placeholder replacement
//! - [`coalesce`]: production bundling of contiguous stylesheets/scripts
//! - [`directive`]: `to-build remove <mode>` regions
//! - [`build`]: the per-document, per-mode orchestrator

mod build;
mod coalesce;
mod directive;
mod extract;
mod rewrite;
mod scan;


pub use build::{BuildOptions, Builder, ModeReport};
pub use coalesce::build_production_targets;
pub use directive::strip_directives;
pub use extract::{Extractor, extract_nested};
pub use rewrite::{apply_changes_from_entity, restore_tag};
pub use scan::PatternSpec;
