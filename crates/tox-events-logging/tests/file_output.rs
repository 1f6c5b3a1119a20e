//! Global subscriber installation with JSONL file output
//!
//! Runs as its own test binary so the global subscriber is only set once.

use std::fs;

use tox_events_logging::{
    ConsoleFormat, EventLogSubscriberBuilder, FileConfig, LoggingError, RotationStrategy,
};

#[test]
fn test_file_output_and_single_install() {
    let dir = tempfile::tempdir().unwrap();
    let file_config = FileConfig {
        directory: dir.path().to_path_buf(),
        prefix: "events".to_string(),
        rotation: RotationStrategy::Never,
        max_files: None,
    };

    let guard = EventLogSubscriberBuilder::new()
        .with_level("debug")
        .with_console(ConsoleFormat::Off)
        .with_file_output(file_config)
        .try_init()
        .unwrap();
    assert!(guard.is_some());

    tracing::warn!(kind = "conference_invite", "Dropped event");

    // A second install must fail, not panic
    let second = EventLogSubscriberBuilder::new().with_console(ConsoleFormat::Off).try_init();
    assert!(matches!(second, Err(LoggingError::AlreadyInitialized(_))));

    drop(guard);

    let contents = fs::read_to_string(dir.path().join("events.log")).unwrap();
    let line = contents
        .lines()
        .find(|line| line.contains("Dropped event"))
        .expect("warn event should reach the log file");
    let json: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(json["level"], "WARN");
    assert_eq!(json["kind"], "conference_invite");
}
