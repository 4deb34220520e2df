//! Core types - pure abstractions shared across the codebase.

mod mode;
mod phase;
mod state;

pub use mode::{BuildMode, TransformFlags};
pub use phase::{BuildPhase, PhaseTracker};
pub use state::{is_shutdown, setup_shutdown_handler, shutdown_signal};
