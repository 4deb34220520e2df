//! In-process preview servers on tiny_http.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tiny_http::{Request, Server};

use super::{ServerManager, ServerSpec, lifecycle, path, response};
use crate::{debug, log};

type Key = (String, String);

struct Running {
    server: Arc<Server>,
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

/// One request loop thread per started server.
pub struct PreviewServers {
    interface: IpAddr,
    running: Mutex<FxHashMap<Key, Running>>,
}

impl PreviewServers {
    pub fn new(interface: IpAddr) -> Self {
        Self {
            interface,
            running: Mutex::new(FxHashMap::default()),
        }
    }

    /// Address a running server actually bound.
    pub fn addr(&self, namespace: &str, name: &str) -> Option<SocketAddr> {
        self.running
            .lock()
            .get(&key(namespace, name))
            .map(|running| running.addr)
    }

    pub fn stop_all(&self) {
        let all: Vec<_> = self.running.lock().drain().collect();
        for ((_, name), running) in all {
            shutdown(&name, running);
        }
    }
}

impl ServerManager for PreviewServers {
    fn start(&self, spec: &ServerSpec) -> bool {
        let key = key(&spec.namespace, &spec.name);
        if self.running.lock().contains_key(&key) {
            debug!("serve"; "{} already running", spec.name);
            return true;
        }

        let (server, addr) = match lifecycle::bind_with_retry(self.interface, spec.port) {
            Ok(bound) => bound,
            Err(e) => {
                log!("serve"; "cannot start {}: {:#}", spec.name, e);
                return false;
            }
        };

        let server = Arc::new(server);
        let roots = Roots {
            dynamic_dirs: spec.dynamic_dirs.clone(),
            dirs: spec.dirs.clone(),
        };
        let handle = {
            let server = Arc::clone(&server);
            thread::spawn(move || run_request_loop(&server, &roots))
        };

        log!(&spec.name; "http://{}", addr);
        self.running
            .lock()
            .insert(key, Running { server, addr, handle });
        true
    }

    fn stop(&self, namespace: &str, name: &str) -> bool {
        let removed = self.running.lock().remove(&key(namespace, name));
        removed.is_some_and(|running| shutdown(name, running))
    }

    fn is_up(&self, namespace: &str, name: &str) -> bool {
        self.running
            .lock()
            .get(&key(namespace, name))
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for PreviewServers {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// Unblock the request loop and wait for its thread.
fn shutdown(name: &str, running: Running) -> bool {
    running.server.unblock();
    let joined = running.handle.join().is_ok();
    debug!("serve"; "{} stopped", name);
    joined
}

struct Roots {
    dynamic_dirs: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

fn run_request_loop(server: &Server, roots: &Roots) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, roots) {
            log!("serve"; "request error: {e}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, roots: &Roots) -> anyhow::Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    match path::locate(request.url(), &roots.dynamic_dirs, &roots.dirs) {
        Some(found) => response::respond_file(request, &found.path, found.dynamic),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpStream};
    use tempfile::TempDir;

    fn spec(name: &str, dirs: Vec<PathBuf>, dynamic_dirs: Vec<PathBuf>) -> ServerSpec {
        ServerSpec {
            namespace: "test".into(),
            name: name.into(),
            port: 0,
            dirs,
            dynamic_dirs,
        }
    }

    fn get(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "{method} {path} HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_start_serve_stop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let servers = PreviewServers::new(IpAddr::V4(Ipv4Addr::LOCALHOST));

        assert!(servers.start(&spec("staging", vec![dir.path().into()], Vec::new())));
        assert!(servers.is_up("test", "staging"));
        let addr = servers.addr("test", "staging").unwrap();

        let page = get(addr, "GET", "/");
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.ends_with("<p>hi</p>"));
        assert!(!page.contains("no-cache"));
        assert!(get(addr, "GET", "/nope.css").starts_with("HTTP/1.1 404"));

        assert!(servers.stop("test", "staging"));
        assert!(!servers.is_up("test", "staging"));
        assert!(!servers.stop("test", "staging"));
    }

    #[test]
    fn test_dynamic_dirs_not_cached() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("a.css"), "a{}").unwrap();
        let servers = PreviewServers::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(servers.start(&spec("development", Vec::new(), vec![src.path().into()])));

        let addr = servers.addr("test", "development").unwrap();
        let head = get(addr, "HEAD", "/a.css");
        assert!(head.starts_with("HTTP/1.1 200"));
        assert!(head.to_ascii_lowercase().contains("cache-control: no-cache"));
        assert!(!head.ends_with("a{}"));
        servers.stop_all();
        assert!(!servers.is_up("test", "development"));
    }
}
