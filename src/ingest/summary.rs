//! Per-batch ingestion results.

use serde::Serialize;
use std::path::PathBuf;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Ingested {
        composition_id: i64,
        artist: String,
        title: String,
        year: Option<i64>,
        from_filename: bool,
        /// False when some tag write-back step failed
        tags_updated: bool,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub files: Vec<FileReport>,
}

impl IngestSummary {
    pub fn push(&mut self, path: PathBuf, status: FileStatus) {
        self.files.push(FileReport { path, status });
    }

    pub fn ingested(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Ingested { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.ingested()
    }
}
