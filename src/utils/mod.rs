//! Utility modules shared by the pipeline, the CLI and the preview servers.

pub mod exec;
pub mod hash;
pub mod mime;
pub mod path;
pub mod plural;

pub use plural::plural_count;
