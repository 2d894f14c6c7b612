//! Moving ingested files into artist-named folders.
//!
//! When relocation is enabled, `/in/Daft Punk - One More Time.mp3` becomes
//! `<root>/Daft Punk/Daft Punk - One More Time.mp3`, where `<root>` defaults
//! to the file's own directory. The filename itself is never changed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};

/// Where an ingested file would land for `artist`.
pub fn artist_folder_destination(source: &Path, artist: &str, root: Option<&Path>) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::relocation(format!("{} has no file name", source.display())))?;

    let root = match root {
        Some(root) => root.to_path_buf(),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    Ok(root.join(sanitize_filename(artist)).join(file_name))
}

/// Moves `source` into the folder for `artist` and returns the new path.
///
/// A file already in place is left alone. An existing different file at the
/// destination is never overwritten.
pub fn relocate_to_artist_folder(source: &Path, artist: &str, root: Option<&Path>) -> Result<PathBuf> {
    let dest_path = artist_folder_destination(source, artist, root)?;

    if dest_path == source {
        return Ok(dest_path);
    }
    if dest_path.exists() {
        return Err(Error::relocation(format!(
            "Destination already exists: {}",
            dest_path.display()
        )));
    }

    move_file(source, &dest_path)?;

    tracing::info!(
        target: "organizer",
        from = %source.display(),
        to = %dest_path.display(),
        "Relocated file"
    );

    Ok(dest_path)
}

/// Puts a relocated file back where it came from.
///
/// The artist folder is removed again when the move left it empty.
pub fn undo_relocation(relocated: &Path, original: &Path) -> Result<()> {
    if original.exists() {
        return Err(Error::relocation(format!(
            "Cannot restore, path is occupied: {}",
            original.display()
        )));
    }

    move_file(relocated, original)?;
    if let Some(folder) = relocated.parent() {
        // Fails harmlessly when other files live there
        let _ = fs::remove_dir(folder);
    }

    tracing::info!(
        target: "organizer",
        from = %relocated.display(),
        to = %original.display(),
        "Restored file"
    );
    Ok(())
}

/// Moves a file, creating the destination's parent directories.
fn move_file(source: &Path, dest_path: &Path) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .with_context(format!("Failed to create directory: {:?}", parent))?;
    }

    if fs::rename(source, dest_path).is_err() {
        // If rename fails (cross-device), try copy + delete
        fs::copy(source, dest_path)
            .with_context(format!("Failed to copy file to: {:?}", dest_path))?;
        fs::remove_file(source)
            .with_context(format!("Failed to remove source file: {:?}", source))?;
    }
    Ok(())
}

/// Sanitizes a folder name by replacing characters invalid on common filesystems
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    match sanitized.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}
