//! Configuration file management.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default console connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Default link timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Default field delimiter for delimited output
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// Get the path to the configuration file.
pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("vantage").join("config.toml"))
}

/// Load configuration from disk, or return defaults when the file is
/// missing. A file that exists but fails to parse is ignored with a
/// warning rather than aborting the command.
pub fn load_config() -> Config {
    let Ok(path) = config_path() else {
        return Config::default();
    };
    match fs::read_to_string(&path) {
        Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
