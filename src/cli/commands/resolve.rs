//! Dry-run resolution commands.

use std::path::Path;

use crate::config::Config;
use crate::diagnostics::TracingSink;
use crate::ingest::{self, IngestOptions, Resolution};
use crate::metadata::{self, LoftyTagProvider, RawTagData};

/// Resolve a filename and optional tag values without touching anything
pub fn cmd_resolve(
    config: &Config,
    filename: &str,
    artist: Option<&str>,
    title: Option<&str>,
    year: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let raw = RawTagData {
        artist: artist.map(str::to_string),
        title: title.map(str::to_string),
        year,
        ..RawTagData::default()
    };

    let resolution = resolve_or_bail(filename, &raw, &IngestOptions::from(config))?;

    if json {
        println!("{}", serde_json::to_string_pretty(resolution.identity())?);
    } else {
        print_resolution(&resolution);
    }
    Ok(())
}

/// Print a file's tags and the identity they would resolve to
pub fn cmd_tags(config: &Config, path: &Path) -> anyhow::Result<()> {
    let raw = metadata::read(&LoftyTagProvider, path, &TracingSink)?;

    println!("File:     {}", path.display());
    println!("Artist:   {}", raw.artist.as_deref().unwrap_or("-"));
    println!("Title:    {}", raw.title.as_deref().unwrap_or("-"));
    println!("Album:    {}", raw.album.as_deref().unwrap_or("-"));
    println!("Genre:    {}", raw.genre.as_deref().unwrap_or("-"));
    println!(
        "Year:     {}",
        raw.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Duration: {}",
        raw.duration
            .map(|d| format!("{}:{:02}", d.as_secs() / 60, d.as_secs() % 60))
            .unwrap_or_else(|| "-".to_string())
    );
    println!();

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let resolution = resolve_or_bail(&filename, &raw, &IngestOptions::from(config))?;
    print_resolution(&resolution);
    Ok(())
}

fn resolve_or_bail(filename: &str, raw: &RawTagData, options: &IngestOptions) -> anyhow::Result<Resolution> {
    ingest::resolve(filename, raw, options).ok_or_else(|| anyhow::anyhow!(ingest::IngestError::Unresolvable))
}

fn print_resolution(resolution: &Resolution) {
    let identity = resolution.identity();
    let source = if resolution.from_filename() { "filename" } else { "tags" };

    println!("Artist:      {}", identity.artist);
    println!("Composition: {}", identity.composition);
    match identity.year {
        Some(year) => println!("Year:        {}", year),
        None => println!("Year:        -"),
    }
    println!("Source:      {}", source);
}
