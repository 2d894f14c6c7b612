//! Test utilities and fixtures for tagwright tests.
//!
//! In-memory stand-ins for the tag and persistence collaborators, so the
//! ingestion pipeline can be exercised without real audio files or a
//! database, plus a throwaway SQLite catalog for the tests that want one.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MemoryTagProvider, MemoryTags};
//!
//! let provider = MemoryTagProvider::default();
//! provider.insert("/music/song.mp3", MemoryTags {
//!     title: Some("Song".to_string()),
//!     ..MemoryTags::default()
//! });
//! ```

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::db::Repository;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::metadata::{TagContainer, TagProvider};
use crate::model::{Album, Artist, Composition, Genre, NewComposition};

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; the
/// database is deleted when it is dropped.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

// ============================================================================
// Tags
// ============================================================================

type TagStore = Arc<Mutex<HashMap<String, MemoryTags>>>;

/// Connects an opened [`MemoryTags`] back to its provider entry.
#[derive(Debug, Clone)]
pub struct StoreLink {
    store: TagStore,
    key: String,
}

/// An in-memory tag block.
///
/// Setters stage values; `flush` applies them and bumps `flushes`. Field names
/// listed in `failing` ("artist", "title", "album", "genre", "year",
/// "duration") make the matching accessor return an error.
#[derive(Debug, Clone, Default)]
pub struct MemoryTags {
    pub artists: Vec<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub genres: Vec<String>,
    pub year: Option<u32>,
    pub duration: Duration,
    pub failing: Vec<&'static str>,
    /// Successful flushes that actually wrote something
    pub flushes: usize,
    pub fail_flush: bool,
    pub staged_title: Option<String>,
    pub staged_artists: Option<Vec<String>>,
    pub staged_album: Option<String>,
    pub staged_year: Option<u32>,
    /// Set by [`MemoryTagProvider::open`] so flushes reach the provider
    pub link: Option<StoreLink>,
}

impl MemoryTags {
    fn check(&self, field: &str) -> Result<()> {
        if self.failing.contains(&field) {
            return Err(Error::metadata("memory", format!("{} frame is corrupt", field)));
        }
        Ok(())
    }
}

impl TagContainer for MemoryTags {
    fn artists(&self) -> Result<Vec<String>> {
        self.check("artist")?;
        Ok(self.artists.clone())
    }

    fn title(&self) -> Result<Option<String>> {
        self.check("title")?;
        Ok(self.title.clone())
    }

    fn album(&self) -> Result<Option<String>> {
        self.check("album")?;
        Ok(self.album.clone())
    }

    fn genres(&self) -> Result<Vec<String>> {
        self.check("genre")?;
        Ok(self.genres.clone())
    }

    fn year(&self) -> Result<Option<u32>> {
        self.check("year")?;
        Ok(self.year)
    }

    fn duration(&self) -> Result<Duration> {
        self.check("duration")?;
        Ok(self.duration)
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.staged_title = Some(title.to_string());
        Ok(())
    }

    fn set_artists(&mut self, artists: &[String]) -> Result<()> {
        self.staged_artists = Some(artists.to_vec());
        Ok(())
    }

    fn set_album(&mut self, album: &str) -> Result<()> {
        self.staged_album = Some(album.to_string());
        Ok(())
    }

    fn set_year(&mut self, year: u32) -> Result<()> {
        self.staged_year = Some(year);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.staged_title.is_none()
            && self.staged_artists.is_none()
            && self.staged_album.is_none()
            && self.staged_year.is_none()
        {
            return Ok(());
        }
        if self.fail_flush {
            self.staged_title = None;
            self.staged_artists = None;
            self.staged_album = None;
            self.staged_year = None;
            return Err(Error::metadata("memory", "file is read-only"));
        }

        if let Some(title) = self.staged_title.take() {
            self.title = Some(title);
        }
        if let Some(artists) = self.staged_artists.take() {
            self.artists = artists;
        }
        if let Some(album) = self.staged_album.take() {
            self.album = Some(album);
        }
        if let Some(year) = self.staged_year.take() {
            self.year = Some(year);
        }
        self.flushes += 1;

        if let Some(link) = &self.link {
            let stored = MemoryTags {
                link: None,
                ..self.clone()
            };
            link.store
                .lock()
                .expect("tag store poisoned")
                .insert(link.key.clone(), stored);
        }
        Ok(())
    }
}

/// A [`TagProvider`] over [`MemoryTags`], keyed by file name.
///
/// Keying by file name means a file keeps its tags when relocation moves it
/// to another directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTagProvider {
    store: TagStore,
}

impl MemoryTagProvider {
    fn key(path: impl AsRef<Path>) -> String {
        path.as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn insert(&self, path: impl AsRef<Path>, tags: MemoryTags) {
        self.store
            .lock()
            .expect("tag store poisoned")
            .insert(Self::key(path), tags);
    }

    /// Current stored state of the file's tags.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<MemoryTags> {
        self.store
            .lock()
            .expect("tag store poisoned")
            .get(&Self::key(path))
            .cloned()
    }
}

impl TagProvider for MemoryTagProvider {
    type Container = MemoryTags;

    fn open(&self, path: &Path) -> Result<MemoryTags> {
        let key = Self::key(path);
        let tags = self.get(path).ok_or_else(|| Error::not_found(path))?;
        Ok(MemoryTags {
            link: Some(StoreLink {
                store: Arc::clone(&self.store),
                key,
            }),
            ..tags
        })
    }
}

// ============================================================================
// Repository
// ============================================================================

/// An in-memory [`Repository`] that records what it was asked to do.
///
/// Compositions are staged until `commit`; `rollback` discards them.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub artists: Vec<Artist>,
    /// (artist id, genre name) links
    pub genres: Vec<(i64, String)>,
    pub albums: Vec<Album>,
    pub staged: Vec<Composition>,
    pub compositions: Vec<Composition>,
    pub commits: usize,
    pub rollbacks: usize,
    /// Make every `add_composition` fail
    pub fail_compositions: bool,
}

impl MemoryRepository {
    fn artist(&mut self, name: &str) -> Artist {
        if let Some(artist) = self.artists.iter().find(|a| a.name == name) {
            return artist.clone();
        }
        let artist = Artist {
            id: self.artists.len() as i64 + 1,
            name: name.to_string(),
        };
        self.artists.push(artist.clone());
        artist
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn add_artist(&mut self, name: &str) -> Result<Artist> {
        Ok(self.artist(name))
    }

    async fn add_genre_to_artist(&mut self, artist: &Artist, genre: &str) -> Result<Genre> {
        let link = (artist.id, genre.to_string());
        if !self.genres.contains(&link) {
            self.genres.push(link);
        }
        Ok(Genre {
            id: 1,
            name: genre.to_string(),
        })
    }

    async fn add_album(
        &mut self,
        artist_name: &str,
        album: &str,
        year: Option<i64>,
        label: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Album> {
        let artist = self.artist(artist_name);
        if let Some(existing) = self
            .albums
            .iter()
            .find(|a| a.artist_id == artist.id && a.title == album)
        {
            return Ok(existing.clone());
        }
        let album = Album {
            id: self.albums.len() as i64 + 1,
            title: album.to_string(),
            artist_id: artist.id,
            year,
            label: label.map(str::to_string),
            kind: kind.map(str::to_string),
        };
        self.albums.push(album.clone());
        Ok(album)
    }

    async fn add_composition(&mut self, new: NewComposition) -> Result<Composition> {
        if self.fail_compositions {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }

        let path = new.path.to_string_lossy().into_owned();
        let id = self
            .compositions
            .iter()
            .chain(&self.staged)
            .find(|c| c.path == path)
            .map(|c| c.id)
            .unwrap_or(self.compositions.len() as i64 + self.staged.len() as i64 + 1);

        let composition = Composition {
            id,
            title: new.title.clone(),
            artist_id: new.artist_id,
            album_id: new.album_id,
            path,
            duration_ms: new.duration_ms(),
            year: new.year,
            from_filename: new.from_filename,
            ingested_at: "1970-01-01T00:00:00+00:00".to_string(),
        };
        self.staged.retain(|c| c.id != id);
        self.staged.push(composition.clone());
        Ok(composition)
    }

    async fn find_composition(&mut self, path: &Path) -> Result<Option<Composition>> {
        let path = path.to_string_lossy();
        Ok(self
            .staged
            .iter()
            .chain(&self.compositions)
            .find(|c| c.path == path)
            .cloned())
    }

    async fn artist_by_id(&mut self, id: i64) -> Result<Artist> {
        self.artists
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(Error::Database(sqlx::Error::RowNotFound))
    }

    async fn update_composition(&mut self, composition: &Composition) -> Result<Composition> {
        let current = self
            .staged
            .iter()
            .chain(&self.compositions)
            .find(|c| c.id == composition.id)
            .cloned()
            .ok_or(Error::Database(sqlx::Error::RowNotFound))?;
        let updated = Composition {
            title: composition.title.clone(),
            artist_id: composition.artist_id,
            album_id: composition.album_id,
            year: composition.year,
            ..current
        };
        self.staged.retain(|c| c.id != updated.id);
        self.staged.push(updated.clone());
        Ok(updated)
    }

    async fn set_album_year(&mut self, album_id: i64, year: i64) -> Result<()> {
        if let Some(album) = self.albums.iter_mut().find(|a| a.id == album_id) {
            album.year = Some(year);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        for composition in self.staged.drain(..) {
            self.compositions.retain(|c| c.id != composition.id);
            self.compositions.push(composition);
        }
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.staged.clear();
        self.rollbacks += 1;
        Ok(())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A sink that keeps every message for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("sink poisoned").clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .expect("sink poisoned")
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_temp_db_creates_valid_database() {
        let (pool, _dir) = temp_db().await;

        let compositions = crate::db::list_compositions(&pool).await.unwrap();
        assert!(compositions.is_empty());
    }

    #[test]
    fn test_flush_reaches_provider() {
        let provider = MemoryTagProvider::default();
        provider.insert("/a/song.mp3", MemoryTags::default());

        let mut tags = provider.open(Path::new("/b/song.mp3")).unwrap();
        tags.set_title("Song").unwrap();
        assert_eq!(provider.get("/a/song.mp3").unwrap().title, None);

        tags.flush().unwrap();
        let stored = provider.get("/a/song.mp3").unwrap();
        assert_eq!(stored.title.as_deref(), Some("Song"));
        assert_eq!(stored.flushes, 1);
    }

    #[test]
    fn test_failing_field() {
        let tags = MemoryTags {
            failing: vec!["year"],
            ..MemoryTags::default()
        };
        assert!(tags.year().is_err());
        assert!(tags.title().is_ok());
    }

    #[tokio::test]
    async fn test_memory_repository_rollback() {
        let mut repo = MemoryRepository::default();
        let artist = repo.add_artist("A").await.unwrap();
        repo.add_composition(NewComposition {
            artist_id: artist.id,
            album_id: None,
            title: "T".to_string(),
            duration: None,
            path: PathBuf::from("/t.mp3"),
            year: None,
            from_filename: false,
        })
        .await
        .unwrap();

        repo.rollback().await.unwrap();

        assert!(repo.compositions.is_empty());
        assert_eq!(repo.rollbacks, 1);
    }
}
