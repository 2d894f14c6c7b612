//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `ingest`: Register audio files in the catalog and correct their tags
//! - `edit`: Set artist, title, album or year on many files and their catalog records
//! - `resolve`: Show how a filename and tags would be resolved, without side effects
//! - `list`: Print the catalog
//! - `init`: Write a default configuration file

mod edit;
mod ingest;
mod init;
mod list;
mod resolve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config;
use crate::editor::EditRequest;

pub use edit::cmd_edit;
pub use ingest::cmd_ingest;
pub use init::cmd_init_config;
pub use list::cmd_list;
pub use resolve::{cmd_resolve, cmd_tags};

/// Tagwright CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: the OS config directory)
    #[arg(long, global = true, env = "TAGWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Ingest audio files or directories into the catalog
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Move each file into a folder named after its artist
        #[arg(long)]
        relocate: bool,
        /// Parent directory for artist folders (implies --relocate)
        #[arg(long)]
        relocate_root: Option<PathBuf>,
        /// Do not correct the files' tags
        #[arg(long)]
        no_write_back: bool,
        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set tags on audio files and update their catalog records
    Edit {
        /// Files or directories to edit
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Replace the performer list with this artist
        #[arg(long)]
        artist: Option<String>,
        /// Set the title
        #[arg(long)]
        title: Option<String>,
        /// Set the album
        #[arg(long)]
        album: Option<String>,
        /// Set the year
        #[arg(long)]
        year: Option<u32>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Resolve a filename into artist, composition and year
    Resolve {
        /// Filename, including its extension
        filename: String,
        /// Artist tag value
        #[arg(long)]
        artist: Option<String>,
        /// Title tag value
        #[arg(long)]
        title: Option<String>,
        /// Year tag value
        #[arg(long)]
        year: Option<i64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the tags of an audio file and how it would be resolved
    Tags {
        /// Path to the audio file
        path: PathBuf,
    },
    /// List all compositions in the catalog
    List {
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a configuration file with default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was specified.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let rt = Runtime::new()?;
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Some(Commands::Ingest {
            paths,
            db,
            relocate,
            relocate_root,
            no_write_back,
            json,
        }) => {
            cmd_ingest(
                &rt,
                &config,
                paths,
                db.as_deref(),
                *relocate,
                relocate_root.as_deref(),
                *no_write_back,
                *json,
            )?;
            Ok(true)
        }
        Some(Commands::Edit {
            paths,
            artist,
            title,
            album,
            year,
            db,
        }) => {
            let request = EditRequest {
                artist: artist.clone(),
                title: title.clone(),
                album: album.clone(),
                year: *year,
            };
            cmd_edit(&rt, &config, paths, &request, db.as_deref())?;
            Ok(true)
        }
        Some(Commands::Resolve {
            filename,
            artist,
            title,
            year,
            json,
        }) => {
            cmd_resolve(
                &config,
                filename,
                artist.as_deref(),
                title.as_deref(),
                *year,
                *json,
            )?;
            Ok(true)
        }
        Some(Commands::Tags { path }) => {
            cmd_tags(&config, path)?;
            Ok(true)
        }
        Some(Commands::List { db, json }) => {
            cmd_list(&rt, &config, db.as_deref(), *json)?;
            Ok(true)
        }
        Some(Commands::InitConfig { force }) => {
            cmd_init_config(cli.config.as_deref(), *force)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
