//! `build` command: every entry document, every selected mode.

use anyhow::{Result, bail};

use crate::asset::{CommandBundler, NativeMinifier};
use crate::config::Config;
use crate::pipeline::{Builder, ModeReport};
use crate::utils::plural_count;

/// Build all modes, then fail if any entry document could not be built.
pub fn build_all(config: &Config) -> Result<()> {
    let reports = run_build(config, |_| {});
    check_reports(&reports)
}

/// Run the pipeline for the configured entries and modes.
///
/// `on_written` runs once per mode, after all its documents are written.
pub fn run_build(config: &Config, on_written: impl FnMut(&ModeReport)) -> Vec<ModeReport> {
    let options = config.build_options();
    let bundler = CommandBundler::new(config.bundler.command.clone());
    Builder::new(&options, &NativeMinifier, &bundler).build_all(
        &config.build.entries,
        &config.build.modes,
        on_written,
    )
}

/// Error out when any mode left an entry document unbuilt.
pub fn check_reports(reports: &[ModeReport]) -> Result<()> {
    if reports.iter().all(ModeReport::is_success) {
        return Ok(());
    }
    let failed: usize = reports.iter().map(|r| r.failed_documents.len()).sum();
    bail!("{} could not be built", plural_count(failed, "document"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::core::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = test_parse_config("[build]\nmodes = [\"staging\"]\nmanifest = false");
        config.root = dir.path().to_path_buf();
        config.build.output = dir.path().join("dist");
        config.build.entries = vec![dir.path().join("index.html")];
        config
    }

    #[test]
    fn test_build_all_writes_selected_modes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>plain</p>").unwrap();

        build_all(&config(&dir)).unwrap();
        assert!(dir.path().join("dist/staging/index.html").is_file());
        assert!(!dir.path().join("dist/production").exists());
    }

    #[test]
    fn test_missing_entry_fails_build() {
        let dir = TempDir::new().unwrap();
        let err = build_all(&config(&dir)).unwrap_err();
        assert!(err.to_string().contains("1 document"));
    }

    #[test]
    fn test_callback_sees_each_mode() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>plain</p>").unwrap();
        let mut config = config(&dir);
        config.build.modes = BuildMode::BUILT.to_vec();

        let mut seen = Vec::new();
        let reports = run_build(&config, |report| seen.push(report.mode));
        assert_eq!(seen, BuildMode::BUILT.to_vec());
        assert!(check_reports(&reports).is_ok());
    }
}
