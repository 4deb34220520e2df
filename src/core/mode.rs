//! Build modes and the transform flags each mode runs with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Build target.
///
/// - `Development`: serve the source tree as-is, no build step
/// - `Staging`: readable filenames, source maps, one output file per asset
/// - `Production`: minified, content-hashed and coalesced bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Staging,
    Production,
}

impl BuildMode {
    /// Modes that produce an output tree, in the order they are built.
    pub const BUILT: [Self; 2] = [Self::Staging, Self::Production];

    /// Lowercase name, also the directive token and output subdirectory.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Apply the mode-entry policy to caller-supplied flags.
    ///
    /// Production always minifies and never emits source maps.
    pub const fn flags(self, requested: TransformFlags) -> TransformFlags {
        match self {
            Self::Production => TransformFlags {
                minify_css: true,
                minify_js: true,
                sourcemaps: false,
            },
            _ => requested,
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown build mode `{other}`")),
        }
    }
}

/// Per-pass transform switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformFlags {
    pub minify_css: bool,
    pub minify_js: bool,
    pub sourcemaps: bool,
}

impl Default for TransformFlags {
    fn default() -> Self {
        Self {
            minify_css: true,
            minify_js: true,
            sourcemaps: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_forces_flags() {
        let requested = TransformFlags {
            minify_css: false,
            minify_js: false,
            sourcemaps: true,
        };
        let flags = BuildMode::Production.flags(requested);
        assert!(flags.minify_css);
        assert!(flags.minify_js);
        assert!(!flags.sourcemaps);
    }

    #[test]
    fn test_staging_keeps_flags() {
        let requested = TransformFlags {
            minify_css: false,
            minify_js: true,
            sourcemaps: true,
        };
        assert_eq!(BuildMode::Staging.flags(requested), requested);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("prod".parse::<BuildMode>(), Ok(BuildMode::Production));
        assert_eq!("staging".parse::<BuildMode>(), Ok(BuildMode::Staging));
        assert!("release".parse::<BuildMode>().is_err());
    }
}
