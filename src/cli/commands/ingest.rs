//! Batch ingestion command.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::db::{self, SqliteRepository};
use crate::diagnostics::TracingSink;
use crate::ingest::{FileStatus, IngestOptions, IngestSummary, Ingestor};
use crate::metadata::LoftyTagProvider;
use crate::scanner;

/// Ingest files and directories into the catalog
#[allow(clippy::too_many_arguments)]
pub fn cmd_ingest(
    rt: &Runtime,
    config: &Config,
    paths: &[PathBuf],
    db_path: Option<&Path>,
    relocate: bool,
    relocate_root: Option<&Path>,
    no_write_back: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut options = IngestOptions::from(config);
    if relocate {
        options.relocate = true;
    }
    if let Some(root) = relocate_root {
        options.relocate = true;
        options.relocate_root = Some(root.to_path_buf());
    }
    if no_write_back {
        options.write_back = false;
    }

    let files = scanner::collect_audio_files(paths);
    if files.is_empty() {
        println!("No audio files found.");
        return Ok(());
    }

    let db_path = db_path.or(config.database.path.as_deref());
    let summary = rt.block_on(async {
        let pool = db::init_db(&db::db_url(db_path)).await?;
        let mut ingestor = Ingestor::new(LoftyTagProvider, SqliteRepository::new(pool), options)
            .with_sink(TracingSink);
        Ok::<_, anyhow::Error>(ingestor.ingest_batch(&files).await)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.failed() > 0 {
        anyhow::bail!("{} of {} files could not be ingested", summary.failed(), summary.files.len());
    }
    Ok(())
}

fn print_summary(summary: &IngestSummary) {
    for report in &summary.files {
        match &report.status {
            FileStatus::Ingested {
                artist,
                title,
                year,
                from_filename,
                tags_updated,
                ..
            } => {
                let year = year.map(|y| format!(" ({})", y)).unwrap_or_default();
                let source = if *from_filename { "filename" } else { "tags" };
                println!(
                    "OK      {} -> {} - {}{} [from {}]",
                    report.path.display(),
                    artist,
                    title,
                    year,
                    source
                );
                if !tags_updated {
                    println!("        warning: tags could not be fully updated");
                }
            }
            FileStatus::Failed { reason } => {
                println!("FAILED  {}: {}", report.path.display(), reason);
            }
        }
    }

    println!(
        "\nCompleted: {} ingested, {} failed",
        summary.ingested(),
        summary.failed()
    );
}
