//! CLI integration tests.
//!
//! Tests the command-line interface by running the binary as a subprocess.

mod common;

use std::fs;
use std::process::Command;

use common::Project;

/// Path to the compiled binary
const BINARY: &str = env!("CARGO_BIN_EXE_bib2rst");

#[test]
fn test_cli_help() {
    // Given: the CLI binary
    let output = Command::new(BINARY)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    // Then: help is displayed with expected content
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("bib2rst") || stdout.contains("publications page"),
        "Help should mention the tool name or purpose: {}",
        stdout
    );
    assert!(output.status.success(), "Help should exit with success");
}

#[test]
fn test_cli_default_paths_from_project_root() {
    // Given: a project tree matching the default path constants
    let project = Project::new();

    // When: the binary runs with no arguments from the project root
    let output = Command::new(BINARY)
        .current_dir(project.root.path())
        .output()
        .expect("Failed to execute command");

    // Then: it succeeds and writes research.rst
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "expected success, stderr: {}", stderr);
    assert!(stderr.contains("wrote"), "expected summary on stderr: {}", stderr);

    let result = fs::read_to_string(project.output_path()).unwrap();
    assert!(result.contains("|id1Surveys|"));
    assert!(result.contains(".. |id1Surveys| raw:: html"));
}

#[test]
fn test_cli_explicit_paths() {
    let project = Project::new();
    let output_path = project.root.path().join("publications.rst");

    let output = Command::new(BINARY)
        .arg("--bibtex-dir")
        .arg(project.bibtex_dir())
        .arg("--template")
        .arg(project.template_path())
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "expected success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output_path.exists());
}

#[test]
fn test_cli_missing_bibtex_dir() {
    // Given: an empty directory with no bibtex/ tree
    let empty = tempfile::TempDir::new().unwrap();

    let output = Command::new(BINARY)
        .current_dir(empty.path())
        .output()
        .expect("Failed to execute command");

    // Then: exit code 1 and an error naming the missing collection
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {}", stderr);
    assert!(stderr.contains("Full.bib"), "stderr: {}", stderr);
}

#[test]
fn test_cli_unknown_identifier_exits_with_error() {
    let project = Project::new();
    project.write_section(
        "02-Books.bib",
        "@misc{ghost, author={Doe, Jane}, title={T}, year={2020}}",
    );

    let output = Command::new(BINARY)
        .current_dir(project.root.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost"), "stderr: {}", stderr);
    assert!(!project.output_path().exists(), "no partial output on failure");
}

#[test]
fn test_cli_template_without_placeholder() {
    let project = Project::new();
    project.write_template("Research\n========\n\nno token\n");

    let output = Command::new(BINARY)
        .current_dir(project.root.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<TAG>"), "stderr: {}", stderr);
    assert!(!project.output_path().exists(), "no partial output on failure");
}

#[test]
fn test_cli_missing_venue_warns_but_succeeds() {
    let project = Project::new();
    project.write_full(
        "@misc{id1, author = {Doe, Jane}, title = {T}, year = {2020}}\n",
    );
    project.write_section(
        "01-Surveys.bib",
        "@misc{id1, author = {Doe, Jane}, title = {T}, year = {2020}}\n",
    );

    let output = Command::new(BINARY)
        .current_dir(project.root.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning"), "stderr: {}", stderr);

    // Empty venue leaves ". , year." in the line, per the formatting contract.
    let result = fs::read_to_string(project.output_path()).unwrap();
    assert!(result.contains("- T by Jane Doe. , 2020. |id1Surveys|"));
}
