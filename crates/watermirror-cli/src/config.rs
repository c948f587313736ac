//! CLI configuration file.
//!
//! Stored as TOML at `<config dir>/watermirror/config.toml`:
//!
//! ```toml
//! [source]
//! base_url = "http://192.168.50.172:8001"
//! timeout_secs = 10
//!
//! [history]
//! page_size = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::ConfigKey;

/// Backend the sensor data is read from when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://192.168.50.172:8001";

const MAX_PAGE_SIZE: u32 = 100;
const MAX_TIMEOUT_SECS: u64 = 300;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where readings come from.
    pub source: SourceConfig,
    /// History pagination settings.
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load from `path` if given, otherwise from the default location.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.source.validate();
        errors.extend(self.history.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply_overrides(
        &mut self,
        base_url: Option<&str>,
        timeout_secs: Option<u64>,
        page_size: Option<u32>,
    ) {
        if let Some(url) = base_url {
            self.source.base_url = url.to_string();
        }
        if let Some(timeout) = timeout_secs {
            self.source.timeout_secs = timeout;
        }
        if let Some(size) = page_size {
            self.history.page_size = size;
        }
    }

    /// Current value of a key, as it would be written to the file.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::BaseUrl => self.source.base_url.clone(),
            ConfigKey::Timeout => self.source.timeout_secs.to_string(),
            ConfigKey::PageSize => self.history.page_size.to_string(),
        }
    }

    /// Set a key from its string form. The result is validated.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let invalid = |field: &str| {
            ConfigError::Validation(vec![ValidationError {
                field: field.to_string(),
                message: format!("'{}' is not a valid number", value),
            }])
        };

        match key {
            ConfigKey::BaseUrl => self.source.base_url = value.trim().to_string(),
            ConfigKey::Timeout => {
                self.source.timeout_secs = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("source.timeout_secs"))?;
            }
            ConfigKey::PageSize => {
                self.history.page_size = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("history.page_size"))?;
            }
        }
        self.validate()
    }

    /// Restore a key to its default value.
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BaseUrl => self.source.base_url = SourceConfig::default().base_url,
            ConfigKey::Timeout => self.source.timeout_secs = SourceConfig::default().timeout_secs,
            ConfigKey::PageSize => self.history.page_size = HistoryConfig::default().page_size,
        }
    }
}

/// Reading source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the history endpoint's host.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl SourceConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate source configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let url = self.base_url.trim();
        if url.is_empty() {
            errors.push(ValidationError {
                field: "source.base_url".to_string(),
                message: "base URL cannot be empty".to_string(),
            });
        } else {
            let host = url
                .strip_prefix("http://")
                .or_else(|| url.strip_prefix("https://"));
            match host {
                None => errors.push(ValidationError {
                    field: "source.base_url".to_string(),
                    message: format!("'{}' must start with http:// or https://", url),
                }),
                Some(host) if host.trim_matches('/').is_empty() => {
                    errors.push(ValidationError {
                        field: "source.base_url".to_string(),
                        message: format!("'{}' has no host", url),
                    })
                }
                Some(_) => {}
            }
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(ValidationError {
                field: "source.timeout_secs".to_string(),
                message: format!(
                    "timeout must be between 1 and {} seconds, got {}",
                    MAX_TIMEOUT_SECS, self.timeout_secs
                ),
            });
        }

        errors
    }
}

/// History pagination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Readings requested per page.
    pub page_size: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: watermirror_core::DEFAULT_PAGE_SIZE,
        }
    }
}

impl HistoryConfig {
    /// Validate history configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        if (1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            Vec::new()
        } else {
            vec![ValidationError {
                field: "history.page_size".to_string(),
                message: format!(
                    "page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, self.page_size
                ),
            }]
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field path (e.g., `source.base_url`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("watermirror")
        .join("config.toml")
}
