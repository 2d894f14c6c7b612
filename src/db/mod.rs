//! Catalog persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! [`Repository`] is the narrow contract the ingestion orchestrator
//! registers entities through; [`SqliteRepository`] implements it by staging
//! every write of one file in a transaction until `commit`.
//!
//! # Example
//!
//! ```ignore
//! use crate::db::{init_db, SqliteRepository, Repository};
//!
//! let pool = init_db("sqlite:tagwright.db").await?;
//! let mut repo = SqliteRepository::new(pool);
//! let artist = repo.add_artist("Daft Punk").await?;
//! repo.commit().await?;
//! ```

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Transaction;
use std::path::Path;

use crate::error::{Result, ResultExt};
use crate::model::{Album, Artist, Composition, Genre, NewComposition};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "tagwright.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        Sqlite::create_database(db_url)
            .await
            .with_context(format!("Failed to create database {}", db_url))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Persistence collaborator used by ingestion.
///
/// Every `add_*` is get-or-create, so re-registering the same file is
/// idempotent. Writes become durable on [`Repository::commit`].
#[async_trait]
pub trait Repository: Send {
    async fn add_artist(&mut self, name: &str) -> Result<Artist>;

    async fn add_genre_to_artist(&mut self, artist: &Artist, genre: &str) -> Result<Genre>;

    async fn add_album(
        &mut self,
        artist_name: &str,
        album: &str,
        year: Option<i64>,
        label: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Album>;

    async fn add_composition(&mut self, composition: NewComposition) -> Result<Composition>;

    /// The composition registered at `path`, if any.
    async fn find_composition(&mut self, path: &Path) -> Result<Option<Composition>>;

    async fn artist_by_id(&mut self, id: i64) -> Result<Artist>;

    /// Stores the title, artist, album and year of an existing composition.
    async fn update_composition(&mut self, composition: &Composition) -> Result<Composition>;

    async fn set_album_year(&mut self, album_id: i64, year: i64) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    /// Discards writes staged since the last commit.
    async fn rollback(&mut self) -> Result<()>;
}

/// [`Repository`] over a SQLite pool.
pub struct SqliteRepository {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, tx: None }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The open transaction, begun on first use.
    async fn conn(&mut self) -> Result<&mut SqliteConnection> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(&mut **self.tx.insert(tx))
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn add_artist(&mut self, name: &str) -> Result<Artist> {
        let conn = self.conn().await?;
        Ok(get_or_create_artist(conn, name).await?)
    }

    async fn add_genre_to_artist(&mut self, artist: &Artist, genre: &str) -> Result<Genre> {
        let conn = self.conn().await?;
        Ok(add_genre_to_artist(conn, artist.id, genre).await?)
    }

    async fn add_album(
        &mut self,
        artist_name: &str,
        album: &str,
        year: Option<i64>,
        label: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Album> {
        let conn = self.conn().await?;
        let artist = get_or_create_artist(&mut *conn, artist_name).await?;
        Ok(get_or_create_album(conn, &artist, album, year, label, kind).await?)
    }

    async fn add_composition(&mut self, composition: NewComposition) -> Result<Composition> {
        let conn = self.conn().await?;
        upsert_composition(conn, &composition)
            .await
            .with_context(format!("Failed to register {}", composition.path.display()))
    }

    async fn find_composition(&mut self, path: &Path) -> Result<Option<Composition>> {
        let conn = self.conn().await?;
        Ok(find_composition_by_path(conn, path).await?)
    }

    async fn artist_by_id(&mut self, id: i64) -> Result<Artist> {
        let conn = self.conn().await?;
        sqlx::query_as("SELECT id, name FROM artists WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .with_context(format!("Artist {} not found", id))
    }

    async fn update_composition(&mut self, composition: &Composition) -> Result<Composition> {
        let conn = self.conn().await?;
        update_composition(conn, composition)
            .await
            .with_context(format!("Failed to update {}", composition.path))
    }

    async fn set_album_year(&mut self, album_id: i64, year: i64) -> Result<()> {
        let conn = self.conn().await?;
        sqlx::query("UPDATE albums SET year = ? WHERE id = ?")
            .bind(year)
            .bind(album_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

/// Get or create an artist by exact name.
pub async fn get_or_create_artist(conn: &mut SqliteConnection, name: &str) -> sqlx::Result<Artist> {
    let row: Option<Artist> = sqlx::query_as("SELECT id, name FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(artist) = row {
        Ok(artist)
    } else {
        let result = sqlx::query("INSERT INTO artists (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        Ok(Artist {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }
}

/// Get or create a genre and link it to an artist.
pub async fn add_genre_to_artist(
    conn: &mut SqliteConnection,
    artist_id: i64,
    name: &str,
) -> sqlx::Result<Genre> {
    let row: Option<Genre> = sqlx::query_as("SELECT id, name FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    let genre = match row {
        Some(genre) => genre,
        None => {
            let result = sqlx::query("INSERT INTO genres (name) VALUES (?)")
                .bind(name)
                .execute(&mut *conn)
                .await?;
            Genre {
                id: result.last_insert_rowid(),
                name: name.to_string(),
            }
        }
    };

    sqlx::query("INSERT OR IGNORE INTO artist_genres (artist_id, genre_id) VALUES (?, ?)")
        .bind(artist_id)
        .bind(genre.id)
        .execute(&mut *conn)
        .await?;

    Ok(genre)
}

/// Get or create an album by title and artist.
///
/// An existing album keeps its year, label and kind; missing ones are filled in.
pub async fn get_or_create_album(
    conn: &mut SqliteConnection,
    artist: &Artist,
    title: &str,
    year: Option<i64>,
    label: Option<&str>,
    kind: Option<&str>,
) -> sqlx::Result<Album> {
    sqlx::query_as::<_, Album>(
        r#"
        INSERT INTO albums (title, artist_id, year, label, kind)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(artist_id, title) DO UPDATE SET
            year = COALESCE(albums.year, excluded.year),
            label = COALESCE(albums.label, excluded.label),
            kind = COALESCE(albums.kind, excluded.kind)
        RETURNING id, title, artist_id, year, label, kind
        "#,
    )
    .bind(title)
    .bind(artist.id)
    .bind(year)
    .bind(label)
    .bind(kind)
    .fetch_one(&mut *conn)
    .await
}

/// Insert or update a composition keyed by its path.
pub async fn upsert_composition(
    conn: &mut SqliteConnection,
    new: &NewComposition,
) -> sqlx::Result<Composition> {
    sqlx::query_as::<_, Composition>(
        r#"
        INSERT INTO compositions
            (title, artist_id, album_id, path, duration_ms, year, from_filename, ingested_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(path) DO UPDATE SET
            title = excluded.title,
            artist_id = excluded.artist_id,
            album_id = excluded.album_id,
            duration_ms = excluded.duration_ms,
            year = excluded.year,
            from_filename = excluded.from_filename,
            ingested_at = excluded.ingested_at
        RETURNING id, title, artist_id, album_id, path, duration_ms, year, from_filename, ingested_at
        "#,
    )
    .bind(&new.title)
    .bind(new.artist_id)
    .bind(new.album_id)
    .bind(new.path.to_string_lossy().into_owned())
    .bind(new.duration_ms())
    .bind(new.year)
    .bind(new.from_filename)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_one(&mut *conn)
    .await
}

/// Look up a composition by its file path.
pub async fn find_composition_by_path(
    conn: &mut SqliteConnection,
    path: &Path,
) -> sqlx::Result<Option<Composition>> {
    sqlx::query_as::<_, Composition>(
        r#"
        SELECT id, title, artist_id, album_id, path, duration_ms, year, from_filename, ingested_at
        FROM compositions WHERE path = ?
        "#,
    )
    .bind(path.to_string_lossy().into_owned())
    .fetch_optional(&mut *conn)
    .await
}

/// Overwrite the editable fields of a composition, keyed by id.
///
/// Path, duration and the ingestion timestamp are left as they were.
pub async fn update_composition(
    conn: &mut SqliteConnection,
    composition: &Composition,
) -> sqlx::Result<Composition> {
    sqlx::query_as::<_, Composition>(
        r#"
        UPDATE compositions
        SET title = ?, artist_id = ?, album_id = ?, year = ?
        WHERE id = ?
        RETURNING id, title, artist_id, album_id, path, duration_ms, year, from_filename, ingested_at
        "#,
    )
    .bind(&composition.title)
    .bind(composition.artist_id)
    .bind(composition.album_id)
    .bind(composition.year)
    .bind(composition.id)
    .fetch_one(&mut *conn)
    .await
}

/// Composition with joined artist and album names, for listing.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct CompositionWithNames {
    pub id: i64,
    pub title: String,
    pub path: String,
    pub duration_ms: Option<i64>,
    pub year: Option<i64>,
    pub from_filename: bool,
    pub artist_name: String,
    /// Album title, if the composition belongs to one
    pub album_name: Option<String>,
}

/// Get all compositions with artist and album names, ordered by artist then title.
pub async fn list_compositions(pool: &SqlitePool) -> sqlx::Result<Vec<CompositionWithNames>> {
    sqlx::query_as::<_, CompositionWithNames>(
        r#"
        SELECT
            c.id, c.title, c.path, c.duration_ms, c.year, c.from_filename,
            a.name AS artist_name,
            al.title AS album_name
        FROM compositions c
        JOIN artists a ON c.artist_id = a.id
        LEFT JOIN albums al ON c.album_id = al.id
        ORDER BY a.name, c.title
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Genre names linked to an artist.
pub async fn genres_for_artist(pool: &SqlitePool, artist_id: i64) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT g.name FROM genres g
        JOIN artist_genres ag ON ag.genre_id = g.id
        WHERE ag.artist_id = ?
        ORDER BY g.name
        "#,
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_db;
    use std::path::PathBuf;
    use std::time::Duration;

    fn new_composition(artist_id: i64, album_id: Option<i64>, path: &str) -> NewComposition {
        NewComposition {
            artist_id,
            album_id,
            title: "One More Time".to_string(),
            duration: Some(Duration::from_secs(320)),
            path: PathBuf::from(path),
            year: Some(2001),
            from_filename: true,
        }
    }

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = init_db(&db_url(Some(&db_path))).await.expect("Failed to init db");
        assert!(db_path.exists());

        let compositions = list_compositions(&pool).await.expect("Failed to query");
        assert!(compositions.is_empty());
    }

    #[test]
    fn test_db_url_default() {
        assert_eq!(db_url(None), "sqlite:tagwright.db");
    }

    #[tokio::test]
    async fn test_artist_is_get_or_create() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool);

        let first = repo.add_artist("Daft Punk").await.unwrap();
        let second = repo.add_artist("Daft Punk").await.unwrap();
        let other = repo.add_artist("Air").await.unwrap();
        repo.commit().await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_album_fills_missing_year() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool);

        let first = repo
            .add_album("Daft Punk", "Discovery", None, None, None)
            .await
            .unwrap();
        let second = repo
            .add_album("Daft Punk", "Discovery", Some(2001), Some("Virgin"), None)
            .await
            .unwrap();
        repo.commit().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.year, Some(2001));
        assert_eq!(second.label.as_deref(), Some("Virgin"));
    }

    #[tokio::test]
    async fn test_genre_linked_to_artist() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool.clone());

        let artist = repo.add_artist("Daft Punk").await.unwrap();
        repo.add_genre_to_artist(&artist, "House").await.unwrap();
        repo.add_genre_to_artist(&artist, "House").await.unwrap();
        repo.add_genre_to_artist(&artist, "Electronic").await.unwrap();
        repo.commit().await.unwrap();

        let genres = genres_for_artist(&pool, artist.id).await.unwrap();
        assert_eq!(genres, vec!["Electronic", "House"]);
    }

    #[tokio::test]
    async fn test_composition_upsert_by_path() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool.clone());

        let artist = repo.add_artist("Daft Punk").await.unwrap();
        let album = repo
            .add_album("Daft Punk", "Discovery", Some(2001), None, None)
            .await
            .unwrap();

        let first = repo
            .add_composition(new_composition(artist.id, Some(album.id), "/music/omt.mp3"))
            .await
            .unwrap();
        let second = repo
            .add_composition(NewComposition {
                title: "One More Time (Edit)".to_string(),
                ..new_composition(artist.id, Some(album.id), "/music/omt.mp3")
            })
            .await
            .unwrap();
        repo.commit().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "One More Time (Edit)");
        assert_eq!(second.duration_ms, Some(320_000));
        assert!(second.from_filename);

        let listed = list_compositions(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].artist_name, "Daft Punk");
        assert_eq!(listed[0].album_name.as_deref(), Some("Discovery"));
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool.clone());

        let artist = repo.add_artist("Ghost").await.unwrap();
        repo.add_composition(new_composition(artist.id, None, "/music/ghost.mp3"))
            .await
            .unwrap();
        repo.rollback().await.unwrap();

        assert!(list_compositions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_composition_keeps_path_and_duration() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool.clone());

        let artist = repo.add_artist("Daft Punk").await.unwrap();
        let registered = repo
            .add_composition(new_composition(artist.id, None, "/music/omt.mp3"))
            .await
            .unwrap();
        repo.commit().await.unwrap();

        let found = repo
            .find_composition(Path::new("/music/omt.mp3"))
            .await
            .unwrap()
            .expect("registered composition");
        assert_eq!(found, registered);
        assert!(repo.find_composition(Path::new("/music/other.mp3")).await.unwrap().is_none());

        let other = repo.add_artist("Air").await.unwrap();
        let album = repo
            .add_album("Air", "Moon Safari", None, None, None)
            .await
            .unwrap();
        repo.set_album_year(album.id, 1998).await.unwrap();
        let updated = repo
            .update_composition(&Composition {
                title: "Sexy Boy".to_string(),
                artist_id: other.id,
                album_id: Some(album.id),
                year: Some(1998),
                duration_ms: None,
                ..found
            })
            .await
            .unwrap();
        repo.commit().await.unwrap();

        assert_eq!(updated.id, registered.id);
        assert_eq!(updated.path, "/music/omt.mp3");
        assert_eq!(updated.duration_ms, Some(320_000));
        assert_eq!(repo.artist_by_id(updated.artist_id).await.unwrap().name, "Air");

        let listed = list_compositions(&pool).await.unwrap();
        assert_eq!(listed[0].title, "Sexy Boy");
        assert_eq!(listed[0].album_name.as_deref(), Some("Moon Safari"));
        let album = repo
            .add_album("Air", "Moon Safari", None, None, None)
            .await
            .unwrap();
        assert_eq!(album.year, Some(1998));
        repo.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_without_writes_is_ok() {
        let (pool, _dir) = temp_db().await;
        let mut repo = SqliteRepository::new(pool);
        repo.commit().await.unwrap();
        repo.rollback().await.unwrap();
    }
}
