//! `status` command: which preview servers answer.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::time::Duration;

use owo_colors::OwoColorize;

use crate::config::Config;
use crate::core::BuildMode;
use crate::log;

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

/// Servers reported on, in start order.
const SERVERS: [BuildMode; 3] = [
    BuildMode::Development,
    BuildMode::Staging,
    BuildMode::Production,
];

/// Probe the configured ports with a TCP connect.
pub fn status(config: &Config) {
    let interface = config.serve.interface;
    print_status(config, |mode| probe(interface, config.serve.port(mode)));
}

/// Log one line per preview server.
pub fn print_status(config: &Config, is_up: impl Fn(BuildMode) -> bool) {
    for mode in SERVERS {
        let port = config.serve.port(mode);
        let state = if is_up(mode) {
            "up".green().to_string()
        } else {
            "down".red().to_string()
        };
        log!(mode.name(); "{}:{} {}", config.serve.interface, port, state);
    }
}

/// Something accepts connections on `interface:port`.
pub fn probe(interface: IpAddr, port: u16) -> bool {
    let ip = if interface.is_unspecified() {
        match interface {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        }
    } else {
        interface
    };
    TcpStream::connect_timeout(&SocketAddr::new(ip, port), PROBE_TIMEOUT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_probe() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(probe(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
        assert!(probe(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));

        drop(listener);
        assert!(!probe(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }
}
