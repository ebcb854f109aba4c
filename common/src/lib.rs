//! Shared utilities for the token-auth workspace
//!
//! This crate provides the plumbing every entrypoint needs:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - External command execution utilities

pub mod command;
pub mod config;
pub mod logging;

pub use command::{run, run_command_line, split_command_line, CommandOutput};
pub use config::{home_dir, ConfigExt};
pub use logging::init_logging;
