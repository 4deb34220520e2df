//! Path and URL utilities.
//!
//! Pure functions for path manipulation, plus the one idempotent side effect
//! (`ensure_dir`) every writer shares.
//!
//! - [`fs`]: Filesystem paths (`normalize_path`, `clean_path`, `relative_url`, `ensure_dir`)
//! - [`route`]: Reference strings (`is_external_link`, `split_suffix`, `decode_path`)

pub mod fs;
pub mod route;

pub use fs::{clean_path, ensure_dir, normalize_path, relative_url};
pub use route::{decode_path, is_external_link, is_fragment, split_suffix};
