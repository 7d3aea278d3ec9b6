//! CLI Integration Tests
//!
//! These tests verify the CLI binary output formats and command behaviors.
//!
//! ```
//! cargo test --package beaconwire-cli --test cli_integration
//! ```

use std::path::Path;
use std::process::{Command, Output};

/// Run beaconwire with an isolated config directory and return output
fn run_in(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_beaconwire"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR")
        .output()
        .expect("Failed to run beaconwire binary")
}

fn run_beaconwire(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    run_in(dir.path(), args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help() {
    let output = run_beaconwire(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["encode", "opcodes", "record", "config", "completions"] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_version() {
    let output = run_beaconwire(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("beaconwire"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    let output = run_beaconwire(&["-q", "-v", "opcodes"]);
    assert!(!output.status.success());
}

// =============================================================================
// Encode Tests
// =============================================================================

#[test]
fn test_encode_major_text() {
    let output = run_beaconwire(&["--no-color", "encode", "set-major", "78"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("set-major"));
    assert!(text.trim_end().ends_with("07 03 4e 00"));
}

#[test]
fn test_encode_negative_power() {
    let output = run_beaconwire(&["--no-color", "encode", "set-rx-power", "-55"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).trim_end().ends_with("07 05 c9"));
}

#[test]
fn test_encode_json() {
    let output = run_beaconwire(&["encode", "set-period", "15027", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
    assert_eq!(json["operation"], "set-period");
    assert_eq!(json["hex"], "07 07 b3 3a");
    assert_eq!(json["module"], 7);
}

#[test]
fn test_encode_compact_json_is_one_line() {
    let output = run_beaconwire(&["encode", "ibeacon-enable", "--format", "json", "--compact"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 1);
}

#[test]
fn test_encode_csv() {
    let output = run_beaconwire(&["encode", "set-minor", "7453", "--format", "csv"]);
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "operation,module,register,hex");
    assert_eq!(lines[1], "set-minor,0x07,0x04,07 04 1d 1d");
}

#[test]
fn test_encode_unknown_operation() {
    let output = run_beaconwire(&["encode", "set-colour", "red"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown operation"));
}

#[test]
fn test_encode_out_of_range() {
    let output = run_beaconwire(&["encode", "set-major", "70000"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid major"));
}

#[test]
fn test_encode_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.txt");
    let output = run_in(
        dir.path(),
        &[
            "--no-color",
            "--output",
            path.to_str().unwrap(),
            "encode",
            "set-tx-power",
            "-12",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.trim_end().ends_with("07 06 f4"));
}

// =============================================================================
// Opcodes Tests
// =============================================================================

#[test]
fn test_opcodes_json() {
    let output = run_beaconwire(&["opcodes", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = json.as_array().expect("opcodes should be an array");
    assert_eq!(rows.len(), 17);
    assert!(
        rows.iter()
            .any(|row| row["name"] == "fusion-mode" && row["module"] == 0x19)
    );
}

#[test]
fn test_opcodes_text_header() {
    let output = run_beaconwire(&["--no-color", "opcodes"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("OPERATION"));
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_record_csv_frames() {
    let output = run_beaconwire(&["record", "--format", "csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "operation,module,register,hex",
            "create-counter,0x09,0x02,09 02 01 01 ff 00 02 13",
            "event-entry,0x0a,0x02,0a 02 09 03 00 07 03 02 09 00",
            "event-terminate,0x0a,0x03,0a 03 00 00",
        ]
    );
}

#[test]
fn test_record_json_summary() {
    let output = run_beaconwire(&["record", "--minor", "-s", "2", "-b", "desk", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["board"], "desk");
    assert_eq!(json["entries"], 1);
    assert_eq!(json["frames"].as_array().unwrap().len(), 3);
    assert_eq!(json["frames"][1]["hex"], "0a 02 09 03 00 07 04 02 05 00");
}

#[test]
fn test_record_invalid_counter_size() {
    let output = run_beaconwire(&["record", "--counter-size", "9"]);
    assert!(!output.status.success());
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_set_changes_default_format() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_in(dir.path(), &["config", "set", "format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_in(dir.path(), &["encode", "set-major", "78"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["hex"], "07 03 4e 00");

    let output = run_in(dir.path(), &["config", "unset", "format"]);
    assert!(output.status.success());
    let output = run_in(dir.path(), &["--no-color", "encode", "set-major", "78"]);
    assert!(stdout(&output).starts_with("set-major"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let output = run_beaconwire(&["config", "set", "colour", "red"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown config key"));
}

// =============================================================================
// Completions Tests
// =============================================================================

#[test]
fn test_completions_bash() {
    let output = run_beaconwire(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("beaconwire"));
}
