//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

/// Default board name for simulated sessions.
pub const DEFAULT_BOARD: &str = "beacon";

/// Default counter width in bytes.
pub const DEFAULT_COUNTER_SIZE: u8 = 4;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format (text, json, csv)
    #[serde(default)]
    pub format: Option<String>,

    /// Default board name
    #[serde(default)]
    pub board: Option<String>,

    /// Default counter width for `record`
    #[serde(default)]
    pub counter_size: Option<u8>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beaconwire")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, or return default if missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Set `key` from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "format" => {
                if OutputFormat::from_config(value).is_none() {
                    bail!("Invalid format '{}'. Expected text, json or csv", value);
                }
                self.format = Some(value.to_lowercase());
            }
            "board" => self.board = Some(value.to_string()),
            "counter_size" => {
                let size: u8 = value
                    .parse()
                    .with_context(|| format!("Invalid counter size '{}'", value))?;
                if !(1..=4).contains(&size) {
                    bail!("Counter size must be 1-4, got {}", size);
                }
                self.counter_size = Some(size);
            }
            _ => bail!("Unknown config key '{}'. Expected format, board or counter_size", key),
        }
        Ok(())
    }

    /// Reset `key` to its default.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "format" => self.format = None,
            "board" => self.board = None,
            "counter_size" => self.counter_size = None,
            _ => bail!("Unknown config key '{}'. Expected format, board or counter_size", key),
        }
        Ok(())
    }
}

/// Resolve the output format from the command line, then config, then text.
pub fn resolve_format(arg: Option<OutputFormat>, config: &Config) -> OutputFormat {
    arg.or_else(|| config.format.as_deref().and_then(OutputFormat::from_config))
        .unwrap_or_default()
}

/// Resolve the board name from the command line, then config.
pub fn resolve_board(arg: Option<String>, config: &Config) -> String {
    arg.or_else(|| config.board.clone())
        .unwrap_or_else(|| DEFAULT_BOARD.to_string())
}

/// Resolve the counter width from the command line, then config.
pub fn resolve_counter_size(arg: Option<u8>, config: &Config) -> u8 {
    arg.or(config.counter_size).unwrap_or(DEFAULT_COUNTER_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_prefers_arg() {
        let config = Config {
            format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(Some(OutputFormat::Csv), &config),
            OutputFormat::Csv
        );
    }

    #[test]
    fn test_resolve_format_falls_back_to_config() {
        let config = Config {
            format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_format(None, &config), OutputFormat::Json);
    }

    #[test]
    fn test_resolve_format_ignores_invalid_config() {
        let config = Config {
            format: Some("yaml".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_format(None, &config), OutputFormat::Text);
    }

    #[test]
    fn test_resolve_board_and_size_defaults() {
        let config = Config::default();
        assert_eq!(resolve_board(None, &config), DEFAULT_BOARD);
        assert_eq!(resolve_counter_size(None, &config), DEFAULT_COUNTER_SIZE);
        assert_eq!(resolve_counter_size(Some(2), &config), 2);
    }

    #[test]
    fn test_set_and_unset() {
        let mut config = Config::default();
        config.set("format", "JSON").unwrap();
        config.set("board", "desk").unwrap();
        config.set("counter_size", "2").unwrap();
        assert_eq!(config.format.as_deref(), Some("json"));
        assert_eq!(config.board.as_deref(), Some("desk"));
        assert_eq!(config.counter_size, Some(2));

        assert!(config.set("counter_size", "5").is_err());
        assert!(config.set("format", "yaml").is_err());
        assert!(config.set("colour", "red").is_err());

        config.unset("board").unwrap();
        assert_eq!(config.board, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            format: Some("csv".to_string()),
            board: Some("desk".to_string()),
            counter_size: Some(1),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_load_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path), Config::default());

        fs::write(&path, "counter_size = \"lots\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
