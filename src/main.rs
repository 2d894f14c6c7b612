//! Tagwright - audio metadata resolution and cataloguing.
//!
//! Reads the tags of audio files, reconciles them with what the filename
//! says, registers the result in a SQLite catalog and writes the corrected
//! artist and title back into the file.

pub mod cli;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod ingest;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod organizer;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str =
    "tagwright=info,ingest=info,editor=info,organizer=info,scanner=info,metadata=warn";

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if !cli::run_command(&args)? {
        // No command specified
        cli::Cli::command().print_help()?;
        println!();
    }

    Ok(())
}
