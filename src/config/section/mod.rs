//! Configuration section definitions.
//!
//! Each module corresponds to a section in `to-build.toml`:
//!
//! | Module    | TOML Section  | Purpose                              |
//! |-----------|---------------|--------------------------------------|
//! | `build`   | `[build]`     | Output, lookup roots, flags, modes   |
//! | `bundler` | `[bundler]`   | External module bundler              |
//! | `serve`   | `[serve]`     | Preview server ports                 |

mod build;
mod bundler;
mod serve;

pub use build::BuildSectionConfig;
pub use bundler::BundlerConfig;
pub use serve::ServeConfig;
