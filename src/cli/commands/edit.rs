//! Multi-file tag edit command.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::db::{self, SqliteRepository};
use crate::diagnostics::TracingSink;
use crate::editor::{EditRequest, Editor};
use crate::metadata::LoftyTagProvider;
use crate::scanner;

/// Apply one edit to every audio file under `paths`
pub fn cmd_edit(
    rt: &Runtime,
    config: &Config,
    paths: &[PathBuf],
    request: &EditRequest,
    db_path: Option<&Path>,
) -> anyhow::Result<()> {
    if request.is_empty() {
        anyhow::bail!("Nothing to edit (pass --artist, --title, --album or --year)");
    }

    let files = scanner::collect_audio_files(paths);
    if files.is_empty() {
        println!("No audio files found.");
        return Ok(());
    }

    let db_path = db_path.or(config.database.path.as_deref());
    let results = rt.block_on(async {
        let pool = db::init_db(&db::db_url(db_path)).await?;
        let mut editor = Editor::new(LoftyTagProvider, SqliteRepository::new(pool)).with_sink(TracingSink);
        Ok::<_, anyhow::Error>(editor.edit_files(&files, request).await)
    })?;

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(edit) => {
                let written: Vec<_> = edit.written().collect();
                let changed = if written.is_empty() {
                    "tags already current".to_string()
                } else {
                    format!("wrote {}", written.join(", "))
                };
                let record = if edit.composition.is_some() { "" } else { " [not in catalog]" };
                println!("OK      {}: {}{}", path.display(), changed, record);
                if !edit.tags_complete() {
                    println!("        warning: tags could not be fully updated");
                }
            }
            Err(e) => {
                failed += 1;
                println!("FAILED  {}: {}", path.display(), e);
            }
        }
    }

    println!("\nCompleted: {} edited, {} failed", results.len() - failed, failed);
    if failed > 0 {
        anyhow::bail!("{} of {} files could not be edited", failed, results.len());
    }
    Ok(())
}
