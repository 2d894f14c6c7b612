//! Idempotent write-back of resolved artist and title.
//!
//! A value is only written when the file does not already carry it: the new
//! value is compared, case-insensitively, against the current one and left
//! alone when it already contains it. Writing the same identity twice is a
//! no-op the second time, and a tag is never regressed to an empty value.

use super::container::TagContainer;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;

/// What a write attempt did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The tag was changed and flushed.
    Written,
    /// The file already represented the value; nothing was touched.
    Unchanged,
}

/// Whether `new` should replace `current`.
///
/// `new` must be non-empty, and either `current` is absent or `new` does not
/// already contain it (ignoring case). A blank `current` counts as absent.
pub fn needs_update(new: &str, current: Option<&str>) -> bool {
    if new.is_empty() {
        return false;
    }
    match current.filter(|c| !c.trim().is_empty()) {
        None => true,
        Some(current) => !new.to_lowercase().contains(&current.to_lowercase()),
    }
}

/// Puts `artist` in front of the existing performer list, dropping blank entries.
pub fn prepend_artist(artist: &str, existing: &[String]) -> Vec<String> {
    let mut artists = Vec::with_capacity(existing.len() + 1);
    artists.push(artist.to_string());
    artists.extend(existing.iter().filter(|a| !a.trim().is_empty()).cloned());
    artists
}

/// The lead performer, ignoring blank entries at the front of the list.
fn lead_artist(existing: &[String]) -> Option<&str> {
    existing
        .iter()
        .map(String::as_str)
        .find(|a| !a.trim().is_empty())
}

/// Overwrites the title when the file does not already carry it.
pub fn write_title<C: TagContainer>(tags: &mut C, title: &str) -> Result<WriteOutcome> {
    let current = tags.title()?;
    if !needs_update(title, current.as_deref()) {
        return Ok(WriteOutcome::Unchanged);
    }

    tags.set_title(title)?;
    tags.flush()?;
    Ok(WriteOutcome::Written)
}

/// Prepends the artist when the file's lead performer is not already it.
pub fn write_artist<C: TagContainer>(tags: &mut C, artist: &str) -> Result<WriteOutcome> {
    let existing = tags.artists()?;
    if !needs_update(artist, lead_artist(&existing)) {
        return Ok(WriteOutcome::Unchanged);
    }

    tags.set_artists(&prepend_artist(artist, &existing))?;
    tags.flush()?;
    Ok(WriteOutcome::Written)
}

/// Sets the album when the file does not already carry it.
pub fn write_album<C: TagContainer>(tags: &mut C, album: &str) -> Result<WriteOutcome> {
    let current = tags.album()?;
    if !needs_update(album, current.as_deref()) {
        return Ok(WriteOutcome::Unchanged);
    }

    tags.set_album(album)?;
    tags.flush()?;
    Ok(WriteOutcome::Written)
}

/// Sets the year when it differs from the file's.
pub fn write_year<C: TagContainer>(tags: &mut C, year: u32) -> Result<WriteOutcome> {
    if tags.year()? == Some(year) {
        return Ok(WriteOutcome::Unchanged);
    }

    tags.set_year(year)?;
    tags.flush()?;
    Ok(WriteOutcome::Written)
}

/// Makes `artist` the only performer.
///
/// Unlike [`write_artist`] the existing list is dropped, not kept behind the
/// new lead.
pub fn replace_artists<C: TagContainer>(tags: &mut C, artist: &str) -> Result<WriteOutcome> {
    if artist.is_empty() {
        return Ok(WriteOutcome::Unchanged);
    }
    let existing = tags.artists()?;
    if existing.len() == 1 && existing[0] == artist {
        return Ok(WriteOutcome::Unchanged);
    }

    tags.set_artists(&[artist.to_string()])?;
    tags.flush()?;
    Ok(WriteOutcome::Written)
}

/// Result of correcting both fields of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBackReport {
    /// `None` when the artist write failed.
    pub artist: Option<WriteOutcome>,
    /// `None` when the title write failed.
    pub title: Option<WriteOutcome>,
}

impl WriteBackReport {
    pub fn is_complete(&self) -> bool {
        self.artist.is_some() && self.title.is_some()
    }
}

/// Writes artist then title, reporting failures instead of returning them.
pub fn write_back<C: TagContainer>(
    tags: &mut C,
    artist: &str,
    title: &str,
    sink: &dyn DiagnosticSink,
) -> WriteBackReport {
    let artist = swallow("artist", write_artist(tags, artist), sink);
    let title = swallow("title", write_title(tags, title), sink);
    WriteBackReport { artist, title }
}

fn swallow(field: &str, result: Result<WriteOutcome>, sink: &dyn DiagnosticSink) -> Option<WriteOutcome> {
    match result {
        Ok(outcome) => {
            tracing::debug!(target: "metadata::write", field, ?outcome, "Write-back");
            Some(outcome)
        }
        Err(e) => {
            tracing::warn!(target: "metadata::write", field, error = %e, "Write-back failed");
            sink.report(&format!("Could not update {} tag: {}", field, e));
            None
        }
    }
}
