use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::domain::models::LoggingConfig;

const LOG_FILE_NAME: &str = "pollwise.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Install the global subscriber.
    ///
    /// `RUST_LOG` overrides `config.level`. Console output goes to stderr so
    /// `--json` command output on stdout stays machine-readable. When
    /// `config.log_dir` is set, a JSON file layer is added through a
    /// non-blocking rolling appender; the returned logger owns its flush
    /// guard and must be kept alive for the life of the process.
    ///
    /// # Errors
    /// Returns an error on an invalid level, format or rotation, or when a
    /// global subscriber is already installed.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = || {
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        };

        let mut layers: Vec<BoxedLayer> = vec![console_layer(&config.format)?
            .with_filter(env_filter())
            .boxed()];

        let guard = if let Some(ref log_dir) = config.log_dir {
            let appender = file_appender(Path::new(log_dir), &config.rotation)?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(appender);

            // file output is always JSON for structured ingestion
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter())
                    .boxed(),
            );
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        tracing::debug!(
            level = %config.level,
            format = %config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }

    /// Whether a file writer is attached.
    pub fn has_file_output(&self) -> bool {
        self._guard.is_some()
    }
}

fn console_layer(format: &str) -> Result<BoxedLayer> {
    match format {
        "json" => Ok(tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()),
        "pretty" => Ok(tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()),
        other => anyhow::bail!("Invalid log format: {other}"),
    }
}

fn file_appender(log_dir: &Path, rotation: &str) -> Result<RollingFileAppender> {
    match rotation {
        "daily" => Ok(rolling::daily(log_dir, LOG_FILE_NAME)),
        "hourly" => Ok(rolling::hourly(log_dir, LOG_FILE_NAME)),
        "never" => Ok(rolling::never(log_dir, LOG_FILE_NAME)),
        other => anyhow::bail!("Invalid log rotation: {other}"),
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
