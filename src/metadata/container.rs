//! Tag container access.
//!
//! [`TagProvider`] opens a file's embedded tag block and hands out a
//! [`TagContainer`] that is exclusively owned until dropped. Production code
//! uses the lofty-backed [`LoftyTagProvider`]; tests substitute the in-memory
//! fakes from `test_utils`.

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// An open tag block for one audio file.
///
/// Every accessor is fallible on its own so a broken frame does not hide the
/// others. Setters only stage changes; [`TagContainer::flush`] persists them.
pub trait TagContainer {
    /// Performer list, lead artist first.
    fn artists(&self) -> Result<Vec<String>>;
    fn title(&self) -> Result<Option<String>>;
    fn album(&self) -> Result<Option<String>>;
    fn genres(&self) -> Result<Vec<String>>;
    fn year(&self) -> Result<Option<u32>>;
    fn duration(&self) -> Result<Duration>;

    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Replaces the whole performer list.
    fn set_artists(&mut self, artists: &[String]) -> Result<()>;
    fn set_album(&mut self, album: &str) -> Result<()>;
    fn set_year(&mut self, year: u32) -> Result<()>;

    /// Writes staged changes back to the file.
    fn flush(&mut self) -> Result<()>;
}

/// Opens tag containers by path.
pub trait TagProvider {
    type Container: TagContainer;

    fn open(&self, path: &Path) -> Result<Self::Container>;
}

/// Provider backed by the lofty crate (ID3v2, Vorbis comments, MP4, RIFF INFO...).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagProvider;

impl TagProvider for LoftyTagProvider {
    type Container = LoftyTags;

    fn open(&self, path: &Path) -> Result<LoftyTags> {
        let file = Probe::open(path)
            .map_err(|e| Error::metadata(path, format!("Failed to open file for probing: {}", e)))?
            .read()
            .map_err(|e| Error::metadata(path, format!("Failed to read file metadata: {}", e)))?;

        Ok(LoftyTags {
            path: path.to_path_buf(),
            file,
            dirty: false,
        })
    }
}

/// Separator for multiple values inside one ID3v2.4 text frame.
const ID3V2_VALUE_SEPARATOR: char = '\0';

/// A lofty tagged file held open for reading and write-back.
pub struct LoftyTags {
    path: PathBuf,
    file: TaggedFile,
    dirty: bool,
}

impl LoftyTags {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The primary tag, or the first available tag as a fallback.
    fn tag(&self) -> Option<&Tag> {
        self.file.primary_tag().or_else(|| self.file.first_tag())
    }

    /// The primary tag for this format, created when the file has none.
    fn primary_tag_mut(&mut self) -> Result<&mut Tag> {
        let tag_type = self.file.primary_tag_type();
        if self.file.tag(tag_type).is_none() {
            self.file.insert_tag(Tag::new(tag_type));
        }
        self.file
            .tag_mut(tag_type)
            .ok_or_else(|| Error::metadata(&self.path, "Format has no writable tag"))
    }
}

impl TagContainer for LoftyTags {
    fn artists(&self) -> Result<Vec<String>> {
        Ok(self
            .tag()
            .map(|t| {
                t.get_strings(&ItemKey::TrackArtist)
                    .flat_map(|s| s.split(ID3V2_VALUE_SEPARATOR))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn title(&self) -> Result<Option<String>> {
        Ok(self.tag().and_then(|t| t.title().map(|s| s.to_string())))
    }

    fn album(&self) -> Result<Option<String>> {
        Ok(self.tag().and_then(|t| t.album().map(|s| s.to_string())))
    }

    fn genres(&self) -> Result<Vec<String>> {
        Ok(self
            .tag()
            .map(|t| t.get_strings(&ItemKey::Genre).map(str::to_string).collect())
            .unwrap_or_default())
    }

    fn year(&self) -> Result<Option<u32>> {
        Ok(self.tag().and_then(|t| t.year()))
    }

    fn duration(&self) -> Result<Duration> {
        Ok(self.file.properties().duration())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.primary_tag_mut()?.set_title(title.to_string());
        self.dirty = true;
        Ok(())
    }

    fn set_album(&mut self, album: &str) -> Result<()> {
        self.primary_tag_mut()?.set_album(album.to_string());
        self.dirty = true;
        Ok(())
    }

    fn set_year(&mut self, year: u32) -> Result<()> {
        self.primary_tag_mut()?.set_year(year);
        self.dirty = true;
        Ok(())
    }

    fn set_artists(&mut self, artists: &[String]) -> Result<()> {
        let tag = self.primary_tag_mut()?;
        tag.remove_key(&ItemKey::TrackArtist);

        // ID3v2 keeps one TPE1 frame, so repeated items would collapse into one
        if tag.tag_type() == TagType::Id3v2 {
            let joined = artists.join(&ID3V2_VALUE_SEPARATOR.to_string());
            if !joined.is_empty() {
                tag.push(TagItem::new(ItemKey::TrackArtist, ItemValue::Text(joined)));
            }
        } else {
            for artist in artists {
                tag.push(TagItem::new(
                    ItemKey::TrackArtist,
                    ItemValue::Text(artist.clone()),
                ));
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let tag_type = self.file.primary_tag_type();
        let tag = self
            .file
            .tag(tag_type)
            .ok_or_else(|| Error::metadata(&self.path, "No tag staged for writing"))?;

        tag.save_to_path(&self.path, WriteOptions::default())
            .map_err(|e| Error::metadata(&self.path, format!("Failed to write tags to file: {}", e)))?;

        self.dirty = false;
        Ok(())
    }
}
