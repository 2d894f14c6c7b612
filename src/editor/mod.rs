//! Manual tag edits across many files.
//!
//! An [`EditRequest`] names the fields to set: a replacement artist, a title,
//! an album and a year. Each file gets the same edit. The tags are changed
//! first, with the same idempotence rules as ingestion write-back, then the
//! file's catalog record (if it has one) is brought in line and committed.
//!
//! | Field  | Tag rule                                   | Catalog effect                          |
//! |--------|--------------------------------------------|-----------------------------------------|
//! | artist | performer list replaced by the one artist  | composition moves to that artist        |
//! | title  | written unless already contained           | composition renamed                     |
//! | album  | written unless already contained           | album get-or-create, composition linked |
//! | year   | written when different                     | composition year and its album's year   |
//!
//! A tag write failure is reported and the remaining fields still run. A
//! catalog failure rolls back that file's record and is returned.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::db::Repository;
use crate::diagnostics::{DiagnosticSink, NoopSink};
use crate::error::{Error, Result};
use crate::metadata::{
    TagContainer, TagProvider, WriteOutcome, replace_artists, write_album, write_title, write_year,
};
use crate::model::Composition;

/// Fields to set on every file of an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    /// Replaces the whole performer list
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
}

impl EditRequest {
    /// Whether the request would change nothing.
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.artist) && blank(&self.title) && blank(&self.album) && self.year.is_none()
    }

    fn artist(&self) -> Option<&str> {
        non_blank(&self.artist)
    }

    fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    fn album(&self) -> Option<&str> {
        non_blank(&self.album)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Why an edit did not reach a file.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("File not found or not a regular file: {0}")]
    NotFound(PathBuf),

    #[error("Could not open tags: {0}")]
    Unreadable(#[source] Error),

    #[error("Failed to update catalog: {0}")]
    Persistence(#[source] Error),
}

/// Outcome of one tag field of an edit; `None` when the write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: &'static str,
    pub outcome: Option<WriteOutcome>,
}

/// What an edit did to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub path: PathBuf,
    /// One entry per requested field, in artist, title, album, year order
    pub fields: Vec<FieldEdit>,
    /// The updated catalog record, `None` when the file is not catalogued
    pub composition: Option<Composition>,
}

impl FileEdit {
    /// Whether every requested tag write succeeded.
    pub fn tags_complete(&self) -> bool {
        self.fields.iter().all(|f| f.outcome.is_some())
    }

    pub fn written(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.outcome == Some(WriteOutcome::Written))
            .map(|f| f.field)
    }
}

/// Applies [`EditRequest`]s to files and their catalog records.
pub struct Editor<P, R> {
    provider: P,
    repository: R,
    sink: Box<dyn DiagnosticSink>,
}

impl<P: TagProvider, R: Repository> Editor<P, R> {
    pub fn new(provider: P, repository: R) -> Self {
        Self {
            provider,
            repository,
            sink: Box::new(NoopSink),
        }
    }

    /// Routes diagnostics to `sink` instead of dropping them.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Edits every path in order; one file's failure never stops the rest.
    pub async fn edit_files(
        &mut self,
        paths: &[PathBuf],
        request: &EditRequest,
    ) -> Vec<(PathBuf, std::result::Result<FileEdit, EditError>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.edit_file(path, request).await;
            results.push((path.clone(), result));
        }

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(target: "editor", edited = results.len() - failed, failed, "Edit complete");
        results
    }

    /// Edits one file, reporting any failure to the diagnostic sink.
    pub async fn edit_file(
        &mut self,
        path: &Path,
        request: &EditRequest,
    ) -> std::result::Result<FileEdit, EditError> {
        let result = self.apply(path, request).await;
        if let Err(e) = &result {
            warn!(target: "editor", path = %path.display(), error = %e, "File not edited");
            self.sink.report(&format!("{}: {}", path.display(), e));
        }
        result
    }

    async fn apply(
        &mut self,
        path: &Path,
        request: &EditRequest,
    ) -> std::result::Result<FileEdit, EditError> {
        if !path.is_file() {
            return Err(EditError::NotFound(path.to_path_buf()));
        }

        let mut tags = self.provider.open(path).map_err(EditError::Unreadable)?;
        let fields = self.edit_tags(&mut tags, request);
        drop(tags);

        let composition = match self.update_record(path, request).await {
            Ok(composition) => composition,
            Err(e) => {
                if let Err(rollback) = self.repository.rollback().await {
                    warn!(target: "editor", error = %rollback, "Rollback failed");
                }
                return Err(EditError::Persistence(e));
            }
        };

        debug!(
            target: "editor",
            path = %path.display(),
            catalogued = composition.is_some(),
            "Edited"
        );
        Ok(FileEdit {
            path: path.to_path_buf(),
            fields,
            composition,
        })
    }

    fn edit_tags<C: TagContainer>(&self, tags: &mut C, request: &EditRequest) -> Vec<FieldEdit> {
        let mut fields = Vec::new();
        if let Some(artist) = request.artist() {
            fields.push(self.field("artist", replace_artists(tags, artist)));
        }
        if let Some(title) = request.title() {
            fields.push(self.field("title", write_title(tags, title)));
        }
        if let Some(album) = request.album() {
            fields.push(self.field("album", write_album(tags, album)));
        }
        if let Some(year) = request.year {
            fields.push(self.field("year", write_year(tags, year)));
        }
        fields
    }

    fn field(&self, field: &'static str, result: Result<WriteOutcome>) -> FieldEdit {
        let outcome = match result {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(target: "editor", field, error = %e, "Tag edit failed");
                self.sink.report(&format!("Could not update {} tag: {}", field, e));
                None
            }
        };
        FieldEdit { field, outcome }
    }

    /// Brings the file's catalog record in line with the request and commits.
    async fn update_record(&mut self, path: &Path, request: &EditRequest) -> Result<Option<Composition>> {
        let Some(mut composition) = self.repository.find_composition(path).await? else {
            return Ok(None);
        };

        let artist = match request.artist() {
            Some(name) => self.repository.add_artist(name).await?,
            None => self.repository.artist_by_id(composition.artist_id).await?,
        };
        composition.artist_id = artist.id;

        if let Some(title) = request.title() {
            composition.title = title.to_string();
        }

        let year = request.year.map(i64::from);
        if let Some(album) = request.album() {
            let album = self
                .repository
                .add_album(&artist.name, album, year, None, None)
                .await?;
            composition.album_id = Some(album.id);
        }

        if let Some(year) = year {
            composition.year = Some(year);
            if let Some(album_id) = composition.album_id {
                self.repository.set_album_year(album_id, year).await?;
            }
        }

        let updated = self.repository.update_composition(&composition).await?;
        self.repository.commit().await?;
        Ok(Some(updated))
    }
}
