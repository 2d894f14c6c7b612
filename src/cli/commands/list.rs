//! Catalog listing command.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::db;

/// List all compositions in the database
pub fn cmd_list(rt: &Runtime, config: &Config, db_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let db_path = db_path.or(config.database.path.as_deref());
    let compositions = rt.block_on(async {
        let pool = db::init_db(&db::db_url(db_path)).await?;
        Ok::<_, anyhow::Error>(db::list_compositions(&pool).await?)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&compositions)?);
        return Ok(());
    }

    for c in &compositions {
        let album = c
            .album_name
            .as_deref()
            .map(|a| format!(" [{}]", a))
            .unwrap_or_default();
        let year = c.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!("{} - {}{}{}  {}", c.artist_name, c.title, album, year, c.path);
    }
    println!("\n{} compositions", compositions.len());
    Ok(())
}
