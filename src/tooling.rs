//! Tooling Layer
//!
//! Command-line access to tree reconstruction and cache fingerprints.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
