//! Preview servers for the development tree and each built mode.
//!
//! ```text
//! development ──► entry dirs + roots (no-cache) + statics
//! staging     ──► <output>/staging     (restarted after the mode is written)
//! production  ──► <output>/production  (restarted after the mode is written)
//! ```
//!
//! The pipeline only talks to a [`ServerManager`]; [`PreviewServers`] is the
//! in-process implementation used by the CLI.

mod lifecycle;
mod manager;
mod path;
mod response;

pub use manager::PreviewServers;

use anyhow::{Result, anyhow};
use std::path::PathBuf;

use super::build::{check_reports, run_build};
use super::status::print_status;
use crate::config::Config;
use crate::core::{BuildMode, shutdown_signal};
use crate::{debug, log};

/// Namespace every preview server of this tool is registered under.
pub const NAMESPACE: &str = "to-build";

/// What to serve, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    pub namespace: String,
    pub name: String,
    pub port: u16,
    /// Served as-is.
    pub dirs: Vec<PathBuf>,
    /// Searched before `dirs`; answered with `Cache-Control: no-cache`.
    pub dynamic_dirs: Vec<PathBuf>,
}

/// Preview-server coordinator.
pub trait ServerManager {
    fn start(&self, spec: &ServerSpec) -> bool;
    fn stop(&self, namespace: &str, name: &str) -> bool;
    fn is_up(&self, namespace: &str, name: &str) -> bool;
}

impl ServerSpec {
    /// Development server: the source tree, no build step.
    pub fn development(config: &Config) -> Self {
        let mut dynamic_dirs: Vec<PathBuf> = Vec::new();
        let entry_dirs = config.build.entries.iter().filter_map(|e| e.parent());
        for dir in entry_dirs.map(PathBuf::from).chain(config.build.roots.iter().cloned()) {
            if !dynamic_dirs.contains(&dir) {
                dynamic_dirs.push(dir);
            }
        }
        dynamic_dirs.extend(config.build.existing_packages());

        Self {
            namespace: NAMESPACE.to_string(),
            name: BuildMode::Development.name().to_string(),
            port: config.serve.port(BuildMode::Development),
            dirs: config.build.statics.clone(),
            dynamic_dirs,
        }
    }

    /// A built mode's output root.
    pub fn built(config: &Config, mode: BuildMode) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            name: mode.name().to_string(),
            port: config.serve.port(mode),
            dirs: vec![config.build.output.join(mode.name())],
            dynamic_dirs: Vec::new(),
        }
    }
}

/// One stop-then-start request.
pub fn restart(manager: &dyn ServerManager, spec: &ServerSpec) -> bool {
    if manager.stop(&spec.namespace, &spec.name) {
        debug!("serve"; "stopped {}", spec.name);
    }
    manager.start(spec)
}

/// `serve` command: start everything, block until Ctrl+C, stop everything.
pub fn serve(config: &Config, no_build: bool) -> Result<()> {
    let shutdown = shutdown_signal().ok_or_else(|| anyhow!("serve is already running"))?;
    let servers = PreviewServers::new(config.serve.interface);

    let built = start_all(config, no_build, &servers);
    if let Err(e) = &built {
        log!("serve"; "{e:#}, serving what was written");
    }
    print_status(config, |mode| servers.is_up(NAMESPACE, mode.name()));

    shutdown.recv().ok();
    servers.stop_all();
    built
}

/// Start the development server, then build each mode and restart its
/// server as soon as the mode is written.
pub fn start_all(config: &Config, no_build: bool, manager: &dyn ServerManager) -> Result<()> {
    restart(manager, &ServerSpec::development(config));

    if no_build {
        for &mode in &config.build.modes {
            restart(manager, &ServerSpec::built(config, mode));
        }
        return Ok(());
    }

    let reports = run_build(config, |report| {
        restart(manager, &ServerSpec::built(config, report.mode));
    });
    check_reports(&reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Records calls instead of binding sockets.
    #[derive(Default)]
    struct FakeManager {
        calls: RefCell<Vec<String>>,
        up: RefCell<Vec<String>>,
    }

    impl ServerManager for FakeManager {
        fn start(&self, spec: &ServerSpec) -> bool {
            self.calls.borrow_mut().push(format!("start {}:{}", spec.name, spec.port));
            self.up.borrow_mut().push(spec.name.clone());
            true
        }

        fn stop(&self, _namespace: &str, name: &str) -> bool {
            self.calls.borrow_mut().push(format!("stop {name}"));
            let mut up = self.up.borrow_mut();
            let was_up = up.iter().any(|n| n == name);
            up.retain(|n| n != name);
            was_up
        }

        fn is_up(&self, _namespace: &str, name: &str) -> bool {
            self.up.borrow().iter().any(|n| n == name)
        }
    }

    fn config(dir: &TempDir) -> Config {
        let mut config = test_parse_config("[build]\nmanifest = false");
        config.root = dir.path().to_path_buf();
        config.build.output = dir.path().join("dist");
        config.build.entries = vec![dir.path().join("index.html")];
        config
    }

    #[test]
    fn test_one_restart_per_mode() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>x</p>").unwrap();
        let manager = FakeManager::default();

        start_all(&config(&dir), false, &manager).unwrap();
        assert_eq!(
            *manager.calls.borrow(),
            vec![
                "stop development",
                "start development:10000",
                "stop staging",
                "start staging:10002",
                "stop production",
                "start production:10004",
            ]
        );
        assert!(dir.path().join("dist/production/index.html").is_file());
    }

    #[test]
    fn test_no_build_only_restarts() {
        let dir = TempDir::new().unwrap();
        let manager = FakeManager::default();

        start_all(&config(&dir), true, &manager).unwrap();
        assert_eq!(manager.calls.borrow().len(), 6);
        assert!(!dir.path().join("dist").exists());
        assert!(manager.is_up(NAMESPACE, "production"));
    }

    #[test]
    fn test_failed_build_still_starts_servers() {
        let dir = TempDir::new().unwrap();
        let manager = FakeManager::default();

        assert!(start_all(&config(&dir), false, &manager).is_err());
        assert!(manager.is_up(NAMESPACE, "staging"));
    }

    #[test]
    fn test_development_spec() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.build.roots = vec![dir.path().join("src"), dir.path().to_path_buf()];
        config.build.statics = vec![dir.path().join("public")];

        let spec = ServerSpec::development(&config);
        assert_eq!(
            spec.dynamic_dirs,
            vec![dir.path().to_path_buf(), dir.path().join("src")]
        );
        assert_eq!(spec.dirs, vec![dir.path().join("public")]);
        assert_eq!(spec.port, 10000);
    }

    #[test]
    fn test_built_spec_points_at_mode_root() {
        let dir = TempDir::new().unwrap();
        let spec = ServerSpec::built(&config(&dir), BuildMode::Staging);
        assert_eq!(spec.dirs, vec![dir.path().join("dist/staging")]);
        assert!(spec.dynamic_dirs.is_empty());
    }
}
