//! Process-wide shutdown state.
//!
//! The Ctrl+C handler flips `SHUTDOWN` and notifies whoever registered a
//! shutdown channel (the `serve` command waiting on its preview servers).

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{self, Receiver, Sender};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for a blocking `serve`
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `shutdown_signal()`: exit immediately, nothing to tear down
/// - After `shutdown_signal()`: notify the waiting receiver
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            crate::log!("serve"; "shutting down...");
            let _ = tx.send(());
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register for shutdown notification. Returns `None` if already registered.
pub fn shutdown_signal() -> Option<Receiver<()>> {
    let (tx, rx) = channel::bounded(1);
    SHUTDOWN_TX.set(tx).ok().map(|()| rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_signal_registers_once() {
        let rx = shutdown_signal().unwrap();
        assert!(shutdown_signal().is_none());

        SHUTDOWN_TX.get().unwrap().send(()).unwrap();
        assert_eq!(rx.recv(), Ok(()));
    }
}
