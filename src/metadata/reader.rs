//! Field-by-field tag reading that never fails as a whole.

use std::time::Duration;

use super::container::TagContainer;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;

/// Everything the tag block said about a file.
///
/// `None` means the file said nothing (or the field could not be read);
/// `Some("")` means the file explicitly stored an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTagData {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
    /// `None` when the duration could not be determined, distinct from a zero-length file.
    pub duration: Option<Duration>,
}

/// Reads every field independently; failures are reported to `sink` and become `None`.
pub fn read_tags<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> RawTagData {
    RawTagData {
        artist: read_artist(tags, sink),
        title: read_title(tags, sink),
        album: read_album(tags, sink),
        genre: read_genre(tags, sink),
        year: read_year(tags, sink),
        duration: read_duration(tags, sink),
    }
}

/// Lead performer.
pub fn read_artist<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<String> {
    recover("artist", tags.artists(), sink).and_then(|a| a.into_iter().next())
}

pub fn read_title<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<String> {
    recover("title", tags.title(), sink).flatten()
}

pub fn read_album<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<String> {
    recover("album", tags.album(), sink).flatten()
}

/// First listed genre.
pub fn read_genre<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<String> {
    recover("genre", tags.genres(), sink).and_then(|g| g.into_iter().next())
}

pub fn read_year<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<i64> {
    recover("year", tags.year(), sink)
        .flatten()
        .map(i64::from)
}

pub fn read_duration<C: TagContainer>(tags: &C, sink: &dyn DiagnosticSink) -> Option<Duration> {
    recover("duration", tags.duration(), sink)
}

fn recover<T>(field: &str, result: Result<T>, sink: &dyn DiagnosticSink) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(target: "metadata::read", field, error = %e, "Tag field unreadable");
            sink.report(&format!("Could not read {}: {}", field, e));
            None
        }
    }
}
