//! Catalog entities.
//!
//! Defines [`Artist`], [`Genre`], [`Album`] and [`Composition`].
//! These derive SQLx's `FromRow` for database mapping.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `artists` - Artist records with unique names
//! - `genres` - Genre names, linked to artists through `artist_genres`
//! - `albums` - Albums per artist, unique by title
//! - `compositions` - Individual audio files, unique by path

use serde::Serialize;
use sqlx::FromRow;
use std::path::PathBuf;
use std::time::Duration;

/// An artist in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Artist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Artist name (unique)
    pub name: String,
}

/// A genre attached to an artist.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// An album in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Album {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Album title
    pub title: String,
    pub artist_id: i64,
    /// Release year (optional)
    pub year: Option<i64>,
    /// Record label (optional)
    pub label: Option<String>,
    /// Release kind such as "album" or "single" (optional)
    pub kind: Option<String>,
}

/// A composition (audio file) in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Composition {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Composition name (from tags or filename)
    pub title: String,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    /// Absolute file path (unique identifier)
    pub path: String,
    /// Duration in milliseconds, `None` when unreadable
    pub duration_ms: Option<i64>,
    pub year: Option<i64>,
    /// Whether artist/title were derived from the filename rather than tags
    pub from_filename: bool,
    /// RFC 3339 timestamp of the last ingestion
    pub ingested_at: String,
}

/// Input for registering a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComposition {
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub title: String,
    pub duration: Option<Duration>,
    pub path: PathBuf,
    pub year: Option<i64>,
    pub from_filename: bool,
}

impl NewComposition {
    pub fn duration_ms(&self) -> Option<i64> {
        self.duration
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}
