//! `[bundler]` section configuration.
//!
//! The external module bundler used for `<script type="module">` entries.
//!
//! ```toml
//! [bundler]
//! command = ["npx", "esbuild"]    # Program and leading arguments
//! target = "es2018"
//! format = "esm"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    pub command: Vec<String>,
    pub target: String,
    pub format: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            command: vec!["esbuild".into()],
            target: "es2018".into(),
            format: "esm".into(),
        }
    }
}

impl BundlerConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.first().is_none_or(|program| program.trim().is_empty()) {
            diag.error_with_hint(
                FieldPath::new("bundler.command"),
                "bundler command is empty",
                "e.g. `command = [\"esbuild\"]`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_bundler_defaults() {
        assert_eq!(test_parse_config("").bundler, BundlerConfig::default());
    }

    #[test]
    fn test_bundler_command_parsed() {
        let bundler =
            test_parse_config("[bundler]\ncommand = [\"npx\", \"esbuild\"]\ntarget = \"es2020\"")
                .bundler;
        assert_eq!(bundler.command, vec!["npx", "esbuild"]);
        assert_eq!(bundler.target, "es2020");
        assert_eq!(bundler.format, "esm");
    }

    #[test]
    fn test_empty_command_rejected() {
        let bundler = BundlerConfig {
            command: Vec::new(),
            ..BundlerConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        bundler.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
