//! Configuration management for staffdesk
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/staffdesk/
//! - macOS: ~/Library/Application Support/staffdesk/
//! - Windows: %APPDATA%\staffdesk\
//!
//! The API base URL can be overridden with `STAFFDESK_API_BASE_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "STAFFDESK_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// REST backend settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Durable session storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Terminal client settings
    #[serde(default)]
    pub tui: TuiConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Session storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session file location. Defaults to `<data_dir>/staffdesk/session.json`
    pub path: Option<PathBuf>,
}

/// TUI-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Event poll interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    /// Enable mouse capture
    #[serde(default)]
    pub mouse: bool,
}

fn default_base_url() -> String {
    crate::DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}
fn default_tick_rate() -> u64 {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            mouse: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("staffdesk"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location, applying environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        config.apply_env_override(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Load config from specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve where the session file lives
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.storage.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|p| p.join("staffdesk").join("session.json"))
            .ok_or(ConfigError::NoDirFound)
    }

    fn apply_env_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.timeout(), Duration::from_secs(15));
        assert_eq!(config.api.base_url, crate::DEFAULT_BASE_URL);
        assert!(!config.tui.mouse);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://hr.example.com/api"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api.base_url, "https://hr.example.com/api");
        assert_eq!(parsed.api.timeout_secs, 15);
        assert_eq!(parsed.tui.tick_rate_ms, 100);
        assert!(parsed.storage.path.is_none());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();

        config.apply_env_override(Some("   ".to_string()));
        assert_eq!(config.api.base_url, crate::DEFAULT_BASE_URL);

        config.apply_env_override(Some("http://10.0.0.5/api".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("session.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session_path().unwrap(), dir.path().join("session.json"));
    }
}
