//! `[serve]` section configuration.
//!
//! Ports of the three preview servers.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! development = 10000         # Serves the source roots directly
//! staging = 10002             # Serves <output>/staging
//! production = 10004          # Serves <output>/production
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the servers accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::BuildMode;

/// Preview server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    pub development: u16,
    pub staging: u16,
    pub production: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            development: 10000,
            staging: 10002,
            production: 10004,
        }
    }
}

impl ServeConfig {
    pub const fn port(&self, mode: BuildMode) -> u16 {
        match mode {
            BuildMode::Development => self.development,
            BuildMode::Staging => self.staging,
            BuildMode::Production => self.production,
        }
    }

    /// The three ports must be pairwise distinct.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let ports = [
            ("serve.development", self.development),
            ("serve.staging", self.staging),
            ("serve.production", self.production),
        ];
        for (i, &(field, port)) in ports.iter().enumerate() {
            if let Some((other, _)) = ports[..i].iter().find(|&&(_, p)| p == port) {
                diag.error_with_hint(
                    FieldPath::new(field),
                    format!("port {port} is already used by `{other}`"),
                    "give each preview server its own port",
                );
            }
        }
    }
}
