//! Host configuration.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Host configuration. Every field has a default, so a missing file and a
/// partial file both work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the default plugin directory.
    pub plugin_dir: Option<PathBuf>,
    /// Line-buffered confirmation prompts instead of single-key reads.
    pub buffered_input: bool,
}

impl Config {
    /// Path to the configuration file under the platform config dir
    /// (e.g. `~/.config/anvil/config.toml` on Unix). Falls back to the
    /// current directory if the config dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("anvil").join("config.toml")
    }

    /// Loads configuration from the default config file; a missing file
    /// yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError { path, source: e })
    }

    /// The directory modules are discovered in: the configured override,
    /// or `~/.anvil/plugins`.
    pub fn plugin_dir(&self) -> PathBuf {
        if let Some(dir) = &self.plugin_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".anvil")
            .join("plugins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("config.toml")).unwrap();

        assert!(config.plugin_dir.is_none());
        assert!(!config.buffered_input);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "buffered_input = true\n").unwrap();

        let config = Config::load_from(path).unwrap();
        assert!(config.buffered_input);
        assert!(config.plugin_dir.is_none());
    }

    #[test]
    fn plugin_dir_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "plugin_dir = \"/opt/anvil/plugins\"\n").unwrap();

        let config = Config::load_from(path).unwrap();
        assert_eq!(config.plugin_dir(), PathBuf::from("/opt/anvil/plugins"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "plugin_dir = [not toml").unwrap();

        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
