//! Audio file tag reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Supports reading from and writing to MP3, FLAC, OGG, M4A, and WAV files.
//!
//! # Features
//! - Read each field independently, turning failures into absent values
//! - Idempotent write-back of artist and title
//! - Performer list prepend instead of replacement
//! - Album, year and performer-list edits for the `edit` command

pub mod container;
pub mod reader;
pub mod writer;

pub use container::{LoftyTagProvider, LoftyTags, TagContainer, TagProvider};
pub use reader::{RawTagData, read_tags};
pub use writer::{
    WriteBackReport, WriteOutcome, replace_artists, write_album, write_artist, write_back, write_title,
    write_year,
};

use std::path::Path;

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;

/// Opens `path` and reads its tags, closing the container afterwards.
pub fn read<P: TagProvider>(provider: &P, path: &Path, sink: &dyn DiagnosticSink) -> Result<RawTagData> {
    let tags = provider.open(path)?;
    Ok(read_tags(&tags, sink))
}
