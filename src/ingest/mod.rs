//! Ingestion orchestrator.
//!
//! Each file goes through a fixed sequence:
//!
//! ```text
//! START -> read tags -> SUFFICIENT   -> register from tags          -> WRITE_BACK -> DONE
//!                    -> INSUFFICIENT -> synthesize from filename -> register -> WRITE_BACK -> DONE
//! ```
//!
//! Tags are sufficient when both artist and title are present, non-empty and
//! not the placeholder word. Otherwise the filename is split and reconciled
//! with whatever the tags did say (see [`crate::naming`]). Write-back always
//! follows a successful registration and uses the registered values.
//!
//! Failures are file-scoped: [`Ingestor::ingest_batch`] reports them and moves
//! on to the next file. Write-back failures are reported but do not undo the
//! registration.

mod summary;

pub use summary::{FileReport, FileStatus, IngestSummary};

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::diagnostics::{DiagnosticSink, NoopSink};
use crate::error::Error;
use crate::metadata::{RawTagData, TagProvider, WriteBackReport, read_tags, write_back};
use crate::model::{Composition, NewComposition};
use crate::naming::{ResolveRules, ResolvedIdentity, Sentinel, synthesize_identity};
use crate::organizer;

/// Knobs for one ingestion run. Nothing here is process-global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Divider priority and placeholder comparison for filename reconciliation
    pub rules: ResolveRules,
    /// Placeholder comparison for the "tags are enough" decision
    pub sufficiency: Sentinel,
    /// Correct the source file's tags after registration
    pub write_back: bool,
    /// Move each file into an artist-named folder before registering it
    pub relocate: bool,
    /// Parent of the artist folders (default: the file's own directory)
    pub relocate_root: Option<PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            rules: ResolveRules::default(),
            sufficiency: Sentinel::exact(),
            write_back: true,
            relocate: false,
            relocate_root: None,
        }
    }
}

impl From<&Config> for IngestOptions {
    fn from(config: &Config) -> Self {
        let ingest = &config.ingest;
        Self {
            rules: ResolveRules {
                dividers: ingest.dividers.clone(),
                sentinel: Sentinel::new(&ingest.unknown_sentinel, ingest.resolution_match),
            },
            sufficiency: Sentinel::new(&ingest.unknown_sentinel, ingest.sufficiency_match),
            write_back: ingest.write_back,
            relocate: config.relocate.enabled,
            relocate_root: config.relocate.root.clone(),
        }
    }
}

/// Why a file produced no composition.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("File not found or not a regular file: {0}")]
    NotFound(PathBuf),

    #[error("Could not open tags: {0}")]
    Unreadable(#[source] Error),

    #[error("The file does not have enough information to add a song")]
    Unresolvable,

    #[error("Failed to register composition: {0}")]
    Persistence(#[source] Error),
}

/// Where the registered identity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Tags alone named the artist and title.
    Direct(ResolvedIdentity),
    /// Artist and/or title were reconciled with the filename.
    Synthesized(ResolvedIdentity),
}

impl Resolution {
    pub fn identity(&self) -> &ResolvedIdentity {
        match self {
            Resolution::Direct(identity) | Resolution::Synthesized(identity) => identity,
        }
    }

    pub fn from_filename(&self) -> bool {
        matches!(self, Resolution::Synthesized(_))
    }
}

/// Whether the tags alone are authoritative.
pub fn tags_sufficient(raw: &RawTagData, sufficiency: &Sentinel) -> bool {
    !sufficiency.is_vacant(raw.artist.as_deref()) && !sufficiency.is_vacant(raw.title.as_deref())
}

/// Decides the identity for a file named `filename` with tags `raw`.
///
/// Returns `None` when no non-empty artist and title can be produced.
pub fn resolve(filename: &str, raw: &RawTagData, options: &IngestOptions) -> Option<Resolution> {
    if tags_sufficient(raw, &options.sufficiency) {
        let artist = raw.artist.as_deref()?;
        let title = raw.title.as_deref()?;
        return ResolvedIdentity::new(artist, title, raw.year).map(Resolution::Direct);
    }

    synthesize_identity(
        filename,
        raw.artist.as_deref(),
        raw.title.as_deref(),
        raw.year,
        &options.rules,
    )
    .map(Resolution::Synthesized)
}

/// A successfully ingested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub composition: Composition,
    pub resolution: Resolution,
    /// `None` when write-back was disabled or the file could not be reopened
    pub write_back: Option<WriteBackReport>,
}

/// Drives ingestion of files into the catalog.
pub struct Ingestor<P, R> {
    provider: P,
    repository: R,
    options: IngestOptions,
    sink: Box<dyn DiagnosticSink>,
}

impl<P: TagProvider, R: Repository> Ingestor<P, R> {
    pub fn new(provider: P, repository: R, options: IngestOptions) -> Self {
        Self {
            provider,
            repository,
            options,
            sink: Box::new(NoopSink),
        }
    }

    /// Routes diagnostics to `sink` instead of dropping them.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Ingests every path in order; one file's failure never stops the batch.
    pub async fn ingest_batch(&mut self, paths: &[PathBuf]) -> IngestSummary {
        let mut summary = IngestSummary::default();

        for path in paths {
            let status = match self.ingest_file(path).await {
                Ok(ingested) => {
                    let identity = ingested.resolution.identity();
                    FileStatus::Ingested {
                        composition_id: ingested.composition.id,
                        artist: identity.artist.clone(),
                        title: identity.composition.clone(),
                        year: identity.year,
                        from_filename: ingested.resolution.from_filename(),
                        tags_updated: ingested
                            .write_back
                            .is_none_or(|report| report.is_complete()),
                    }
                }
                Err(e) => FileStatus::Failed {
                    reason: e.to_string(),
                },
            };
            summary.push(path.clone(), status);
        }

        info!(
            target: "ingest",
            ingested = summary.ingested(),
            failed = summary.failed(),
            "Batch complete"
        );
        summary
    }

    /// Ingests one file, reporting any failure to the diagnostic sink.
    pub async fn ingest_file(&mut self, path: &Path) -> Result<Ingested, IngestError> {
        let result = self.decompose(path).await;
        if let Err(e) = &result {
            warn!(target: "ingest", path = %path.display(), error = %e, "File not ingested");
            self.sink.report(&format!("{}: {}", path.display(), e));
        }
        result
    }

    async fn decompose(&mut self, path: &Path) -> Result<Ingested, IngestError> {
        if !path.is_file() {
            return Err(IngestError::NotFound(path.to_path_buf()));
        }

        let tags = self.provider.open(path).map_err(IngestError::Unreadable)?;
        let raw = read_tags(&tags, self.sink.as_ref());

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let resolution = resolve(&filename, &raw, &self.options).ok_or(IngestError::Unresolvable)?;
        debug!(
            target: "ingest",
            path = %path.display(),
            from_filename = resolution.from_filename(),
            artist = %resolution.identity().artist,
            title = %resolution.identity().composition,
            "Resolved identity"
        );

        let mut tags = Some(tags);
        let record_path = if self.options.relocate {
            // The container must be released before the file moves
            tags = None;
            self.relocate(path, &resolution.identity().artist)
        } else {
            path.to_path_buf()
        };

        let composition = match self.register(&raw, &resolution, &record_path).await {
            Ok(composition) => composition,
            Err(e) => {
                if let Err(rollback) = self.repository.rollback().await {
                    warn!(target: "ingest", error = %rollback, "Rollback failed");
                }
                if record_path != path {
                    self.undo_relocate(&record_path, path);
                }
                return Err(IngestError::Persistence(e));
            }
        };

        let write_back = if self.options.write_back {
            self.write_back(tags, &record_path, resolution.identity())
        } else {
            None
        };

        info!(
            target: "ingest",
            path = %record_path.display(),
            composition_id = composition.id,
            "Ingested"
        );

        Ok(Ingested {
            composition,
            resolution,
            write_back,
        })
    }

    /// Moves the file into its artist folder, falling back to the original path.
    fn relocate(&self, path: &Path, artist: &str) -> PathBuf {
        match organizer::relocate_to_artist_folder(path, artist, self.options.relocate_root.as_deref()) {
            Ok(new_path) => new_path,
            Err(e) => {
                self.sink
                    .report(&format!("Could not relocate {}: {}", path.display(), e));
                path.to_path_buf()
            }
        }
    }

    /// Moves a relocated file back after its registration failed.
    fn undo_relocate(&self, relocated: &Path, original: &Path) {
        if let Err(e) = organizer::undo_relocation(relocated, original) {
            warn!(target: "ingest", path = %relocated.display(), error = %e, "Could not undo relocation");
            self.sink.report(&format!(
                "{} was left at {}: {}",
                original.display(),
                relocated.display(),
                e
            ));
        }
    }

    async fn register(
        &mut self,
        raw: &RawTagData,
        resolution: &Resolution,
        path: &Path,
    ) -> Result<Composition, Error> {
        let identity = resolution.identity();
        let repo = &mut self.repository;

        let artist = repo.add_artist(&identity.artist).await?;

        if let Some(genre) = raw.genre.as_deref().filter(|g| !g.is_empty()) {
            repo.add_genre_to_artist(&artist, genre).await?;
        }

        let album = match raw.album.as_deref().filter(|a| !a.is_empty()) {
            Some(album) => Some(repo.add_album(&artist.name, album, identity.year, None, None).await?),
            None => None,
        };

        let composition = repo
            .add_composition(NewComposition {
                artist_id: artist.id,
                album_id: album.map(|a| a.id),
                title: identity.composition.clone(),
                duration: raw.duration,
                path: path.to_path_buf(),
                year: identity.year,
                from_filename: resolution.from_filename(),
            })
            .await?;

        repo.commit().await?;
        Ok(composition)
    }

    fn write_back(
        &self,
        tags: Option<P::Container>,
        path: &Path,
        identity: &ResolvedIdentity,
    ) -> Option<WriteBackReport> {
        let mut tags = match tags {
            Some(tags) => tags,
            None => match self.provider.open(path) {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(target: "ingest", path = %path.display(), error = %e, "Write-back skipped");
                    self.sink
                        .report(&format!("Could not reopen {} for write-back: {}", path.display(), e));
                    return None;
                }
            },
        };

        Some(write_back(
            &mut tags,
            &identity.artist,
            &identity.composition,
            self.sink.as_ref(),
        ))
    }
}
