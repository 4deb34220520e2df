//! Asset entities and their transforms.
//!
//! - [`kind`]: asset categories
//! - [`tag`]: tag ids and placeholders
//! - [`entity`] / [`registry`]: the per-pass entity store
//! - [`process`]: per-category transform dispatch
//! - [`minify`] / [`bundle`]: minifier and module-bundler services

pub mod bundle;
mod entity;
mod error;
mod kind;
pub mod minify;
mod process;
mod registry;
mod tag;

pub use bundle::{BundleRequest, CommandBundler, ModuleBundler};
pub use entity::{Entity, Target};
pub use error::{AssetError, AssetResult};
pub use kind::Category;
pub use minify::{Minified, Minifier, NativeMinifier};
pub use process::{TransformContext, transform};
pub use registry::EntityRegistry;
pub use tag::{DELIMITER, Segment, TagId, is_placeholder_safe, segments};
