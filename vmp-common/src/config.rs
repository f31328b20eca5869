//! Configuration loading
//!
//! The player reads a TOML config file; every field has a default so a
//! partial file (or none at all) still yields a runnable configuration.
//! Command-line/environment overrides are applied by the binary on top.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Base URL of the venue platform API
    pub api_base_url: String,
    /// HTTP port the status API listens on
    pub port: u16,
    /// Root directory for cached media and other local data
    pub cache_dir: PathBuf,
    /// Target playlist length (number of upcoming slots)
    pub playlist_length: usize,
    /// Scheduler tick interval in milliseconds
    pub scheduler_tick_ms: u64,
    /// Download coordinator tick interval in milliseconds
    pub downloader_tick_ms: u64,
    /// Catalog refresh interval in seconds
    pub catalog_refresh_secs: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8600/api/player".to_string(),
            port: 5750,
            cache_dir: PathBuf::from("cache"),
            playlist_length: 5,
            scheduler_tick_ms: 1000,
            downloader_tick_ms: 1000,
            catalog_refresh_secs: 300,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Load from a file when a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_base_url = \"http://venue.example/api\"\nplaylist_length = 8"
        )
        .unwrap();

        let config = PlayerConfig::load(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://venue.example/api");
        assert_eq!(config.playlist_length, 8);
        assert_eq!(config.port, PlayerConfig::default().port);
        assert_eq!(config.scheduler_tick_ms, 1000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = PlayerConfig::load(Path::new("/nonexistent/vmp.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_no_path_yields_defaults() {
        let config = PlayerConfig::load_or_default(None).unwrap();
        assert_eq!(config.playlist_length, 5);
        assert_eq!(config.catalog_refresh_secs, 300);
    }
}
