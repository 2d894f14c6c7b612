//! Configuration file bootstrap.

use std::path::Path;

use crate::config::{self, Config};

/// Write the default configuration to `path` or the OS config directory
pub fn cmd_init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = path.map(Path::to_path_buf).or_else(config::config_path);
    if let Some(target) = &target {
        if target.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
        }
    }

    let written = match path {
        Some(p) => config::save_to(&Config::default(), p)?,
        None => config::save(&Config::default())?,
    };
    println!("Wrote default configuration to {}", written.display());
    Ok(())
}
