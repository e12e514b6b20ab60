//! Plugin configuration (pawnregex.cfg)
//!
//! A flat TOML file with a single key:
//!
//! ```toml
//! LocaleName = "en_US.UTF-8"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locale::DEFAULT_LOCALE;

/// Default location, relative to the host's working directory.
pub const DEFAULT_CONFIG_PATH: &str = "plugins/pawnregex.cfg";

/// Errors that can occur while reading or writing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file
    #[error("Failed to access config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persisted plugin settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Locale new scripts compile their patterns under
    #[serde(rename = "LocaleName", default = "default_locale")]
    pub locale_name: String,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale_name: default_locale(),
        }
    }
}

impl Config {
    /// Read the configuration at `path`, creating an empty file first if it
    /// does not exist. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "")?;
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from TOML text.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        if config.locale_name.is_empty() {
            tracing::warn!("empty LocaleName, using {DEFAULT_LOCALE}");
            config.locale_name = default_locale();
        }
        Ok(config)
    }

    /// Write the configuration to `path`, replacing its contents.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
