//! Command-line interface module.

mod args;
pub mod build;
pub mod serve;
pub mod status;

pub use args::{BuildArgs, Cli, Commands};
