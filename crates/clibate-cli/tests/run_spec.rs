#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn clibate() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clibate"))
}

fn write_spec(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("spec.clib");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn run_passes_when_expectations_match() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "file: greeting.txt\n    hello world\n\ncommand: cat greeting.txt\n\ntest: unchanged\n    success:\n        contains \"hello world\"\n        exit_code 0\n",
    );
    let output = clibate().args(["run", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok   unchanged"));
    assert!(stdout.contains("1/1 tests passed"));
}

#[test]
fn run_applies_edit_before_executing_command() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "file: greeting.txt\n    hello world\n\ncommand: cat greeting.txt\n\ntest: patched\n    edit: greeting.txt\n        DIFF 'hello world'\n        ~ 'goodbye world'\n    success:\n        contains \"goodbye world\"\n        not_contains \"hello world\"\n",
    );
    let output = clibate().args(["run", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn edits_roll_back_between_test_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        concat!(
            "file: greeting.txt\n",
            "    hello world\n",
            "\n",
            "command: cat greeting.txt\n",
            "\n",
            "test: first\n",
            "    edit: greeting.txt\n",
            "        DIFF 'hello world'\n",
            "        ~ 'goodbye world'\n",
            "    success:\n",
            "        contains \"goodbye world\"\n",
            "test: second\n",
            "    success:\n",
            "        contains \"hello world\"\n",
        ),
    );
    let output = clibate().args(["run", spec.to_str().unwrap()]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stdout: {stdout}\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("ok   first"));
    assert!(stdout.contains("ok   second"));
}

#[test]
fn run_reports_failure_and_nonzero_exit_on_assertion_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "file: greeting.txt\n    hello world\n\ncommand: cat greeting.txt\n\ntest: mismatched\n    success:\n        contains \"nope\"\n",
    );
    let output = clibate().args(["run", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAIL mismatched"));
}

#[test]
fn check_reports_parse_error_in_bit_stable_format() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "command: echo hi\ntest: bad\n    nonsense line\n");
    let output = clibate().args(["check", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Clibate parsing error:\n"), "got: {stderr}");
}

#[test]
fn check_confirms_well_formed_spec() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "file: greeting.txt\n    hello world\n\ncommand: cat greeting.txt\n\ntest: unchanged\n    success:\n        contains \"hello world\"\n",
    );
    let output = clibate().args(["check", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn include_pulls_in_files_declared_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.clib"), "file: greeting.txt\n    hello world\n").unwrap();
    let spec = write_spec(
        dir.path(),
        "include: base.clib\ncommand: cat greeting.txt\n\ntest: shared\n    success:\n        contains \"hello world\"\n",
    );
    let output = clibate().args(["run", spec.to_str().unwrap()]).output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
