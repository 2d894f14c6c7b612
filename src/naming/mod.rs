//! Name heuristics: turning a filename plus unreliable tags into an identity.
//!
//! The pieces are applied in a fixed order:
//! 1. [`split::resolve_artist_title`] picks artist and title from tags or filename
//! 2. [`extension::strip_extension`] drops a trailing `.mp3` and friends from the title
//! 3. [`year::exclude_year`] cuts a trailing `(YYYY)` from the title
//!
//! [`synthesize_identity`] runs all three and refuses to produce an identity
//! with an empty artist or title.

pub mod extension;
pub mod sentinel;
pub mod split;
pub mod year;

pub use extension::strip_extension;
pub use sentinel::{Sentinel, SentinelMatch};
pub use split::{ResolveRules, resolve_artist_title};
pub use year::{NameAndYear, exclude_year};

use serde::Serialize;

/// The artist, composition name and year chosen for one file.
///
/// Both names are non-empty; [`synthesize_identity`] returns `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub artist: String,
    pub composition: String,
    pub year: Option<i64>,
}

impl ResolvedIdentity {
    /// Builds an identity, rejecting empty names.
    pub fn new(artist: impl Into<String>, composition: impl Into<String>, year: Option<i64>) -> Option<Self> {
        let artist = artist.into();
        let composition = composition.into();
        if artist.is_empty() || composition.is_empty() {
            return None;
        }
        Some(Self {
            artist,
            composition,
            year,
        })
    }
}

/// Derives an identity from `filename` and whatever the tags said.
///
/// The year comes from a `(YYYY)` annotation on the title when it parses to a
/// non-zero number, and from `tag_year` otherwise.
pub fn synthesize_identity(
    filename: &str,
    tag_artist: Option<&str>,
    tag_title: Option<&str>,
    tag_year: Option<i64>,
    rules: &ResolveRules,
) -> Option<ResolvedIdentity> {
    let resolved = resolve_artist_title(filename, tag_title, tag_artist, rules);
    let annotated = exclude_year(strip_extension(&resolved.title));

    let year = annotated.year().filter(|y| *y != 0).or(tag_year);

    ResolvedIdentity::new(resolved.artist.trim(), annotated.into_name(), year)
}
