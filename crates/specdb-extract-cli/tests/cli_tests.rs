//! CLI integration tests for specdb-extract.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors. Nothing here needs a
//! live database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the specdb-extract binary.
fn cmd() -> Command {
    Command::cargo_bin("specdb-extract").unwrap()
}

/// A syntactically valid configuration pointing at a closed port.
const VALID_CONFIG: &str = "\
database:
  host: localhost
  database: specs
  user: reader
  password: secret
extract:
  schema: specification
";

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("count"));
}

#[test]
fn test_extract_subcommand_help() {
    cmd()
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--engine"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_count_command_exists() {
    cmd()
        .args(["count", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("row counts"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("specdb-extract"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

// =============================================================================
// Configuration Error Tests
// =============================================================================

#[test]
fn test_missing_config_fails() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "extract"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_invalid_yaml_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "extract"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_missing_required_fields_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "database:").unwrap();
    writeln!(file, "  host: localhost").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "extract"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Override Validation Tests
// =============================================================================

#[test]
fn test_unknown_schema_override_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", VALID_CONFIG).unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["extract", "--schema", "archive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown schema"));
}

#[test]
fn test_unknown_engine_override_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", VALID_CONFIG).unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["extract", "--engine", "oracle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown engine"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
