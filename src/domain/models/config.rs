use serde::{Deserialize, Serialize};

/// Main configuration structure for pollwise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Text-completion provider configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Closure sweep and generation dispatch configuration
    #[serde(default)]
    pub closure: ClosureConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".pollwise/pollwise.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// Connection URL understood by sqlx.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Text-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletionConfig {
    /// Provider: anthropic or mock
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API key; falls back to `ANTHROPIC_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_tokens() -> u32 {
    2048
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            api_key: None,
        }
    }
}

/// Closure sweep and generation dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClosureConfig {
    /// Seconds between batch sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Run a sweep as soon as the daemon starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// Spawn guide generation instead of awaiting it after closure
    #[serde(default = "default_detach_generation")]
    pub detach_generation: bool,

    /// Consecutive failed sweeps before the daemon gives up
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

const fn default_sweep_interval_secs() -> u64 {
    3600
}

const fn default_run_on_startup() -> bool {
    true
}

const fn default_detach_generation() -> bool {
    true
}

const fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            run_on_startup: default_run_on_startup(),
            detach_generation: default_detach_generation(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}
