//! Tests for loading bot configuration from disk.

use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tictactoe_bot::{BotConfig, FirstMover};

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "invitation_timeout_secs = 45\nround_timeout_secs = 60\nfirst_mover = \"computer\""
    )
    .unwrap();

    let config = BotConfig::from_file(file.path()).unwrap();
    let timing = config.timing();

    assert_eq!(timing.invitation, Duration::from_secs(45));
    assert_eq!(timing.rematch, Duration::from_secs(10));
    assert_eq!(timing.round, Duration::from_secs(60));
    assert_eq!(*config.first_mover(), FirstMover::Computer);
}

#[test]
fn test_missing_file_reports_read_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = BotConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.starts_with("Failed to read config file"));
}

#[test]
fn test_override_first_mover() {
    let config = BotConfig::default().with_first_mover(FirstMover::Computer);
    assert_eq!(*config.first_mover(), FirstMover::Computer);
    assert_eq!(config.timing().rematch, Duration::from_secs(10));
}
