use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project directory holding config and the default database.
pub const PROJECT_DIR: &str = ".pollwise";

/// Environment variable prefix; `__` separates nested keys.
pub const ENV_PREFIX: &str = "POLLWISE_";

/// Configuration error types
#[derive(Error, Debug)]
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

    #[error("Unknown completion provider: {0}. Must be one of: anthropic, mock")]
    UnknownProvider(String),

    #[error("Invalid completion timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid sweep interval: {0}. Must be at least 1 second")]
    InvalidSweepInterval(u64),

    #[error("Invalid max_consecutive_failures: {0}. Must be at least 1")]
    InvalidMaxFailures(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .pollwise/config.yaml (project config, created by init)
    /// 3. .pollwise/local.yaml (project local overrides, optional)
    /// 4. Environment variables (POLLWISE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(PROJECT_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the project files read from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from an explicit file. Environment variables still
    /// take precedence over the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Path of the project config file written by `pollwise init`.
    pub fn project_config_path() -> PathBuf {
        Path::new(PROJECT_DIR).join("config.yaml")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !["json", "pretty"].contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !["daily", "hourly", "never"].contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if !["anthropic", "mock"].contains(&config.completion.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(config.completion.provider.clone()));
        }
        if config.completion.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(0));
        }
        if config.completion.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(0));
        }

        if config.closure.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidSweepInterval(0));
        }
        if config.closure.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidMaxFailures(0));
        }

        Ok(())
    }
}
