//! Logging configuration for tox-events hosts
//!
//! Levels are set per event source rather than globally:
//!
//! - `log_level` covers the event log storage (`tox_events_core`), which
//!   reports growth at `trace` and clears at `debug`.
//! - `producer_level` covers the iteration state (`tox_events::state`),
//!   which reports dropped events at `warn` and tolerated payload failures
//!   at `debug`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tracing target of the event log storage
pub const STORAGE_TARGET: &str = "tox_events_core";

/// Tracing target of the producer state
pub const PRODUCER_TARGET: &str = "tox_events::state";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for everything not covered by a per-source level
    pub default_level: String,

    /// Level for event log growth and clear events
    pub log_level: Option<String>,

    /// Level for dropped events and payload failures
    pub producer_level: Option<String>,

    pub console: ConsoleFormat,

    pub file: Option<FileConfig>,

    /// Record the source file and line of each event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            log_level: None,
            producer_level: None,
            console: ConsoleFormat::Jsonl,
            file: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Pretty console output showing every growth step
    pub fn development() -> Self {
        Self {
            default_level: "debug".to_string(),
            log_level: Some("trace".to_string()),
            console: ConsoleFormat::Pretty,
            include_location: true,
            ..Default::default()
        }
    }

    /// A long-running host: JSONL files only, keeping clears and drops
    pub fn host(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_level: "info".to_string(),
            log_level: Some("debug".to_string()),
            producer_level: Some("debug".to_string()),
            console: ConsoleFormat::Off,
            file: Some(FileConfig {
                directory: log_dir.into(),
                ..Default::default()
            }),
            include_location: false,
        }
    }

    /// Only dropped events reach the console
    pub fn testing() -> Self {
        Self {
            default_level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// `EnvFilter` directives for this configuration
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.default_level.clone()];
        if let Some(level) = &self.log_level {
            directives.push(format!("{}={}", STORAGE_TARGET, level));
        }
        if let Some(level) = &self.producer_level {
            directives.push(format!("{}={}", PRODUCER_TARGET, level));
        }
        directives.join(",")
    }
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleFormat {
    Off,
    #[default]
    Jsonl,
    /// Human-readable with ANSI colors
    Pretty,
}

/// JSONL file output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File name prefix, `tox-events` unless set
    pub prefix: String,
    pub rotation: RotationStrategy,
    /// Rotated files to keep; `None` keeps all of them
    pub max_files: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "tox-events".to_string(),
            rotation: RotationStrategy::Daily,
            max_files: Some(14),
        }
    }
}

/// File rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// Single `{prefix}.log`, truncated on start
    Never,
}
