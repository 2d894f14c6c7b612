//! Command-line interface for tagwright.
//!
//! This module provides CLI commands for ingesting and editing audio files, previewing
//! name resolution, and listing the catalog.

mod commands;

pub use commands::{Cli, Commands, run_command};
