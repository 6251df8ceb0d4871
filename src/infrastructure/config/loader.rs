use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".reflecto";

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "REFLECTO_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid streaming interval {0}: must be at least 1 second")]
    InvalidStreamInterval(&'static str),

    #[error("Invalid LLM provider: {0}. Must be one of: none, mock, echo, http, openai")]
    InvalidLlmProvider(String),

    #[error("Invalid requests_per_second: {0}. Must be at least 1")]
    InvalidRequestsPerSecond(u32),

    #[error("Invalid determinism.fixed_time: {0}. Must be an RFC 3339 instant")]
    InvalidFixedTime(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .reflecto/config.yaml (project config, created by init)
    /// 3. .reflecto/local.yaml (project local overrides, optional)
    /// 4. Environment variables (REFLECTO_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same precedence as [`Self::load`] with the YAML files read from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Self::figment(dir.as_ref())
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(dir: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path of the project config file written by `reflecto init`.
    pub fn project_config_path() -> PathBuf {
        Path::new(CONFIG_DIR).join("config.yaml")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let streaming = &config.streaming;
        for (name, secs) in [
            ("heartbeat_secs", streaming.heartbeat_secs),
            ("presence_secs", streaming.presence_secs),
            ("skills_secs", streaming.skills_secs),
            ("time_of_day_secs", streaming.time_of_day_secs),
            ("idle_timeout_secs", streaming.idle_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidStreamInterval(name));
            }
        }

        let valid_providers = ["none", "mock", "echo", "http", "openai"];
        if !valid_providers.contains(&config.llm.provider.as_str()) {
            return Err(ConfigError::InvalidLlmProvider(config.llm.provider.clone()));
        }
        if config.llm.requests_per_second == 0 {
            return Err(ConfigError::InvalidRequestsPerSecond(
                config.llm.requests_per_second,
            ));
        }

        if let Some(fixed) = &config.determinism.fixed_time {
            if DateTime::parse_from_rfc3339(fixed).is_err() {
                return Err(ConfigError::InvalidFixedTime(fixed.clone()));
            }
        }

        if config.journal.source.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "journal.source cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
