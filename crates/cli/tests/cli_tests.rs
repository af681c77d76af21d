//! CLI integration tests

use std::process::{Command, Output};

fn kcap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kcap"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = kcap(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Kubernetes capacity"),
        "Should show app description"
    );
    for command in ["nodes", "pods", "deploys", "recommend", "report"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig option");
    assert!(stdout.contains("--namespace"), "Should show namespace option");
    assert!(stdout.contains("--format"), "Should show format option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = kcap(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kcap"), "Should show binary name");
}

/// Test recommend subcommand help
#[test]
fn test_recommend_help() {
    let output = kcap(&["recommend", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Recommend help should succeed");
    assert!(stdout.contains("--threshold"), "Should show threshold option");
    assert!(stdout.contains("--namespace"), "Global options should be accepted");
}

/// Test report subcommand help
#[test]
fn test_report_help() {
    let output = kcap(&["report", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Report help should succeed");
    assert!(stdout.contains("--threshold"), "Should show threshold option");
}

/// Test that format values are listed
#[test]
fn test_format_values() {
    let output = kcap(&["nodes", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Nodes help should succeed");
    assert!(stdout.contains("table"), "Should list table format");
    assert!(stdout.contains("json"), "Should list json format");
}

/// Test that an unknown format is rejected
#[test]
fn test_invalid_format() {
    let output = kcap(&["pods", "--format", "yaml"]);
    assert!(!output.status.success(), "Unknown format should fail");
}

/// Test that threshold only applies where it is meaningful
#[test]
fn test_threshold_not_accepted_by_nodes() {
    let output = kcap(&["nodes", "--threshold", "50"]);
    assert!(!output.status.success(), "Nodes should reject --threshold");
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let output = kcap(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}
