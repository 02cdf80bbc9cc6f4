//! Integration tests for the `pinion` binary.
//!
//! Runs the built executable with a clean environment for the core fields
//! and checks that stdout carries only the report.

use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_pinion(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pinion"))
        .args(args)
        .env_remove("ACTIVE_PROFILE")
        .env_remove("LOG_LEVEL")
        .env_remove("UNSTRUCTURED_LOGGER")
        .output()
        .expect("Failed to run pinion")
}

#[test]
fn test_json_report_is_parseable() {
    let output = run_pinion(&["--format", "json", "--profile", "production", "extra"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let report: Value = serde_json::from_str(&stdout).expect("stdout is a single JSON document");
    assert_eq!(report["application"], "pinion");
    assert_eq!(report["profile"], "production");
    assert_eq!(report["arguments"], serde_json::json!(["extra"]));

    // Logs still go out, on stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration loaded"));
}

#[test]
fn test_markdown_report_from_config_file() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("application.ini");
    fs::write(&base, "[Logging]\nLevel = warn\n").unwrap();

    let output = run_pinion(&[
        "--config",
        base.to_str().unwrap(),
        "--profile",
        "test",
        "-ul",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# pinion (test)\n"));
    assert!(stdout.contains("| logLevel | string | `warn` | config-file |"));
    assert!(stdout.contains("| unstructuredLogger | boolean | `true` | command-line |"));
}

#[test]
fn test_unknown_field_flag_fails() {
    let output = run_pinion(&["--profile", "test", "-bogus"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
