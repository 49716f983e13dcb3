//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `homescene.toml` from the working directory, or the file named by
//! `HOMESCENE_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::time::Duration;

use homescene_app::services::scene_manager::ManagerSettings;
use homescene_domain::configuration::ConfigurationDeclaration;
use serde::Deserialize;

const DEFAULT_PATH: &str = "homescene.toml";

/// Default log filter.
pub const DEFAULT_FILTER: &str = "homescened=info,homescene=info";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Refresh timer settings.
    pub scheduler: SchedulerConfig,
    /// Profiles, parts, events, trackers and scenes.
    pub scenes_config: ConfigurationDeclaration,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Refresh timer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two periodic refreshes.
    pub scan_interval_secs: u64,
}

impl Config {
    /// Load configuration from `HOMESCENE_CONFIG` or `homescene.toml` (if
    /// present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HOMESCENE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HOMESCENE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = lookup("HOMESCENE_SCAN_INTERVAL").and_then(|val| val.parse().ok()) {
            self.scheduler.scan_interval_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.scan_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scan interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the scene manager worker.
    #[must_use]
    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings {
            scan_interval: Duration::from_secs(self.scheduler.scan_interval_secs),
            ..ManagerSettings::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
