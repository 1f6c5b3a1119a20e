//! Logging setup for tox-events hosts
//!
//! The library crates only emit `tracing` events. This crate installs a
//! subscriber for them, with per-source levels from [`LogConfig`], JSONL or
//! pretty console output, and optional JSONL file output through
//! `tracing-appender`.
//!
//! # Quick Start
//!
//! ```ignore
//! use tox_events_logging::{EventLogSubscriberBuilder, LogConfig};
//!
//! // JSONL files under ./logs, clears and dropped events included
//! let _guard = EventLogSubscriberBuilder::new()
//!     .with_config(LogConfig::host("./logs"))
//!     .try_init()?;
//! ```
//!
//! `RUST_LOG` replaces the configured directives when set.

pub mod config;

pub use config::{
    ConsoleFormat, FileConfig, LogConfig, PRODUCER_TARGET, RotationStrategy, STORAGE_TARGET,
};

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Log file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log file appender error: {0}")]
    Appender(String),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder for configuring and initializing the logging subscriber
pub struct EventLogSubscriberBuilder {
    config: LogConfig,
}

impl EventLogSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the level for sources without their own level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Set the level for event log growth and clear events
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = Some(level.into());
        self
    }

    /// Choose the console format, or turn the console off
    pub fn with_console(mut self, format: ConsoleFormat) -> Self {
        self.config.console = format;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber globally.
    ///
    /// The returned guard flushes file output when dropped and must be kept
    /// alive for as long as logs should reach the file.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.config.filter_directives())
                .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?,
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();

        if let Some(layer) = self.console_layer() {
            layers.push(layer);
        }

        let mut guard = None;
        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = create_file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(self.file_layer(writer));
        }

        Registry::default()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

        Ok(guard)
    }

    fn console_layer(&self) -> Option<BoxedLayer> {
        let location = self.config.include_location;
        let layer = match self.config.console {
            ConsoleFormat::Off => return None,
            ConsoleFormat::Pretty => tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            ConsoleFormat::Jsonl => tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
        };
        Some(layer)
    }

    fn file_layer(&self, writer: NonBlocking) -> BoxedLayer {
        let location = self.config.include_location;
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_ansi(false)
            .with_file(location)
            .with_line_number(location)
            .with_writer(writer)
            .boxed()
    }
}

impl Default for EventLogSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the file writer. `Never` truncates a single file, the others roll.
fn create_file_writer(file_config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&file_config.directory)?;

    let rotation = match file_config.rotation {
        RotationStrategy::Never => {
            let file_path = file_config
                .directory
                .join(format!("{}.log", file_config.prefix));
            let file = File::create(&file_path)?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&file_config.prefix);
    if let Some(max_files) = file_config.max_files {
        builder = builder.max_log_files(max_files);
    }
    let appender = builder
        .build(&file_config.directory)
        .map_err(|e| LoggingError::Appender(e.to_string()))?;

    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging for testing (minimal output, never fails)
pub fn init_testing() {
    let _ = EventLogSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_jsonl_console() {
        let builder = EventLogSubscriberBuilder::default();
        assert_eq!(builder.config, LogConfig::default());
        assert!(builder.console_layer().is_some());
    }

    #[test]
    fn test_builder_overrides_feed_directives() {
        let builder = EventLogSubscriberBuilder::new()
            .with_config(LogConfig::testing())
            .with_log_level("trace")
            .with_console(ConsoleFormat::Off);
        assert_eq!(builder.config.filter_directives(), "warn,tox_events_core=trace");
        assert!(builder.console_layer().is_none());
    }

    #[test]
    fn test_development_directives_parse() {
        let config = LogConfig::development();
        assert!(EnvFilter::try_new(config.filter_directives()).is_ok());
        assert!(EnvFilter::try_new(LogConfig::host("logs").filter_directives()).is_ok());
    }

    #[test]
    fn test_never_rotation_creates_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            directory: dir.path().join("nested"),
            prefix: "unit".to_string(),
            rotation: RotationStrategy::Never,
            max_files: None,
        };
        let (_writer, guard) = create_file_writer(&config).unwrap();
        drop(guard);
        assert!(dir.path().join("nested").join("unit.log").exists());
    }

    #[test]
    fn test_daily_rotation_uses_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            directory: dir.path().to_path_buf(),
            ..Default::default()
        };
        let (_writer, guard) = create_file_writer(&config).unwrap();
        drop(guard);
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|name| name.starts_with("tox-events")));
    }
}
