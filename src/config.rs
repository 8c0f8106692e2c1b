//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// First publication year the year statistics track
    #[serde(default = "default_first_year")]
    pub first_year: i32,

    /// Last publication year the year statistics track (inclusive)
    #[serde(default = "default_last_year")]
    pub last_year: i32,

    /// Start from the built-in sample books
    #[serde(default = "default_load_samples")]
    pub load_samples: bool,
}

fn default_first_year() -> i32 {
    1900
}

fn default_last_year() -> i32 {
    2023
}

fn default_load_samples() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            first_year: default_first_year(),
            last_year: default_last_year(),
            load_samples: default_load_samples(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("shelfmark").join("config.toml")),
            Some(PathBuf::from("/etc/shelfmark/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(year) = std::env::var("SHELFMARK_FIRST_YEAR") {
            if let Ok(y) = year.parse() {
                self.catalog.first_year = y;
            }
        }
        if let Ok(year) = std::env::var("SHELFMARK_LAST_YEAR") {
            if let Ok(y) = year.parse() {
                self.catalog.last_year = y;
            }
        }

        if let Ok(level) = std::env::var("SHELFMARK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SHELFMARK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Shelfmark Configuration
#
# Environment variables override these settings:
# - SHELFMARK_FIRST_YEAR
# - SHELFMARK_LAST_YEAR
# - SHELFMARK_LOG_LEVEL
# - SHELFMARK_LOG_FORMAT

[catalog]
# Publication years tracked by the year statistics (inclusive).
# Books outside this range are cataloged but not counted.
# Loans are counted against the year they are made, so loans dated after
# last_year are recorded but not counted; raise it to track current loans.
first_year = 1900
last_year = 2023

# Start every session from the built-in sample books
load_samples = true

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
