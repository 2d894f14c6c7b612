//! Expanding command-line inputs into the audio files to ingest.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions treated as audio (compared case-insensitively).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a"];

/// Check if a path has an audio file extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

/// Collects audio files from the given inputs.
///
/// Directories are walked recursively and filtered by extension. Anything
/// else is passed through untouched, so a missing or non-audio file given
/// explicitly still reaches ingestion and is reported there. Results keep
/// input order, with each directory's files sorted by path.
pub fn collect_audio_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| is_audio_file(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            tracing::debug!(target: "scanner", dir = %input.display(), count = found.len(), "Scanned directory");
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    files
}
