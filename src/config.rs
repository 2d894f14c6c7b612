//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tagwright\config.toml
//! - macOS: ~/Library/Application Support/tagwright/config.toml
//! - Linux: ~/.config/tagwright/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::naming::sentinel::{SentinelMatch, UNKNOWN};
use crate::naming::split::default_dividers;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name resolution and write-back settings
    pub ingest: IngestConfig,

    /// Moving ingested files into artist folders
    pub relocate: RelocateConfig,

    /// Catalog database settings
    pub database: DatabaseConfig,
}

/// Name resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Artist/title dividers, highest priority first
    pub dividers: Vec<String>,

    /// Placeholder tag editors write for a missing value
    pub unknown_sentinel: String,

    /// Comparison used when deciding whether tags alone are enough
    pub sufficiency_match: SentinelMatch,

    /// Comparison used when reconciling tags with the filename
    pub resolution_match: SentinelMatch,

    /// Correct the source file's tags after registration
    pub write_back: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dividers: default_dividers(),
            unknown_sentinel: UNKNOWN.to_string(),
            sufficiency_match: SentinelMatch::Exact,
            resolution_match: SentinelMatch::IgnoreCase,
            write_back: true,
        }
    }
}

/// File relocation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    /// Move each ingested file into a folder named after its artist
    pub enabled: bool,

    /// Where artist folders are created (default: next to the file)
    pub root: Option<PathBuf>,
}

/// Catalog database settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file (default: tagwright.db in the working directory)
    pub path: Option<PathBuf>,
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tagwright"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit file
pub fn load_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

/// Save configuration to an explicit file, atomically
pub fn save_to(config: &Config, path: &std::path::Path) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(path.to_path_buf())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[ingest]"));
        assert!(toml.contains("[relocate]"));
        assert!(toml.contains("sufficiency_match = \"exact\""));
        assert!(toml.contains("resolution_match = \"ignore_case\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.ingest.dividers = vec!["_".to_string()];
        config.relocate.enabled = true;
        config.relocate.root = Some(PathBuf::from("/music/sorted"));

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[relocate]
enabled = true
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.relocate.enabled);
        assert_eq!(config.relocate.root, None);
        assert_eq!(config.ingest.dividers, vec!["-", "\u{2014}"]);
        assert_eq!(config.ingest.unknown_sentinel, "Unknown");
        assert!(config.ingest.write_back);
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ingest.write_back = false;
        config.database.path = Some(PathBuf::from("catalog.db"));

        save_to(&config, &path).unwrap();
        assert!(path.exists());
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert_eq!(load_from(&path), Config::default());
    }
}
