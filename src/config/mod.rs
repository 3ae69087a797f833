//! Configuration module
//!
//! Handles loading and saving toroid configuration. Everything here is
//! parsed once at startup; the wrap core never re-reads it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geometry::Axis;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Wrap behavior
    #[serde(default)]
    pub wrap: WrapConfig,
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
    /// Fork to the background after startup
    #[serde(default)]
    pub background: bool,
}

/// Wrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapConfig {
    /// Which axes wrap: "x-only", "y-only", "both" or "none"
    #[serde(default)]
    pub axis: Axis,
    /// Screen width override (auto-detected if not set)
    pub width: Option<u32>,
    /// Screen height override (auto-detected if not set)
    pub height: Option<u32>,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Both,
            width: None,
            height: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("toroid/config.toml")),
            Some(PathBuf::from("./toroid.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    let config = Config {
        wrap: WrapConfig {
            axis: Axis::XOnly,
            width: None,
            height: None,
        },
        ..Default::default()
    };

    toml::to_string_pretty(&config).unwrap()
}
