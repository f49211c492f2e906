//! Executes a sandboxed test's command and captures its stdout, stderr, and
//! exit code. Adapted from the teacher crate's interleaved-capture
//! `run_interleaved`/`execute`, minus the `combined`-stream bookkeeping:
//! clibate expectations only ever examine stdout or stderr on their own, so
//! there is no chunk-splitting consumer to preserve cross-stream ordering
//! for.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use serde::Serialize;

use clibate_common::{evaluate, Expectation};

use crate::document::{ClibateSpec, TestBlock};
use crate::sandbox::Sandbox;

/// What a command produced once it exited.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// The outcome of one `test:` block.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
    pub failures: Vec<String>,
}

/// The outcome of an entire `clibate run` invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub cases: Vec<CaseOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }
}

enum Source {
    Stdout,
    Stderr,
}

fn exit_code_from_status(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.code().unwrap_or_else(|| status.signal().map_or(1, |s| 128 + s))
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

fn run_interleaved(mut child: std::process::Child) -> anyhow::Result<CommandOutput> {
    let stdout_pipe = child.stdout.take().ok_or_else(|| anyhow::anyhow!("stdout not captured"))?;
    let stderr_pipe = child.stderr.take().ok_or_else(|| anyhow::anyhow!("stderr not captured"))?;

    let (tx, rx) = mpsc::channel();
    let tx2 = tx.clone();

    let stdout_thread = thread::spawn(move || {
        let reader = BufReader::new(stdout_pipe);
        for line in reader.lines().map_while(Result::ok) {
            let _ = tx.send((Source::Stdout, line));
        }
    });
    let stderr_thread = thread::spawn(move || {
        let reader = BufReader::new(stderr_pipe);
        for line in reader.lines().map_while(Result::ok) {
            let _ = tx2.send((Source::Stderr, line));
        }
    });

    stdout_thread
        .join()
        .map_err(|_| anyhow::anyhow!("stdout reader thread panicked"))?;
    stderr_thread
        .join()
        .map_err(|_| anyhow::anyhow!("stderr reader thread panicked"))?;

    let mut stdout_lines = Vec::new();
    let mut stderr_lines = Vec::new();
    for (source, line) in rx {
        match source {
            Source::Stdout => stdout_lines.push(line),
            Source::Stderr => stderr_lines.push(line),
        }
    }

    let status = child.wait()?;
    Ok(CommandOutput {
        stdout: join_lines(&stdout_lines),
        stderr: join_lines(&stderr_lines),
        exit_code: exit_code_from_status(status),
    })
}

/// Run `command` (split on whitespace, no shell) with `cwd` as its working
/// directory.
///
/// # Errors
///
/// Returns an error if the command string is empty or the process fails to
/// spawn.
pub fn execute(command: &str, cwd: &Path) -> anyhow::Result<CommandOutput> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| anyhow::anyhow!("empty command"))?;
    let args: Vec<&str> = parts.collect();

    let child = Command::new(program)
        .args(&args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    run_interleaved(child)
}

/// Evaluate every assertion in `expect` against the captured command
/// output, collecting every failure rather than stopping at the first.
fn check_expectations(expect: &Expectation, output: &CommandOutput) -> Vec<String> {
    let mut failures = Vec::new();
    if let Some(code) = expect.exit_code {
        if output.exit_code != code {
            failures.push(format!("expected exit code {code}, got {}", output.exit_code));
        }
    }
    for assertion in &expect.stdout {
        if let Some(msg) = evaluate(assertion, &output.stdout) {
            failures.push(format!("stdout: {msg}"));
        }
    }
    for assertion in &expect.stderr {
        if let Some(msg) = evaluate(assertion, &output.stderr) {
            failures.push(format!("stderr: {msg}"));
        }
    }
    failures
}

/// Run every `test:` block in `spec` against a freshly materialized
/// sandbox, in document order, rolling back each block's edits before the
/// next one runs.
///
/// # Errors
///
/// Returns an error if the sandbox cannot be materialized, a block edits an
/// undeclared file, or an edit batch fails to apply (a `RunError`, not an
/// assertion failure — assertion failures are reported in the returned
/// [`RunReport`] instead).
pub fn run_spec(spec: &ClibateSpec, verbose: bool) -> anyhow::Result<RunReport> {
    let mut sandbox = Sandbox::materialize(spec)?;
    let mut cases = Vec::new();

    for (index, test) in spec.tests.iter().enumerate() {
        let name = test.name.clone().unwrap_or_else(|| format!("test #{}", index + 1));
        if verbose {
            eprintln!("[clibate] running '{name}'");
        }
        let outcome = run_one(&mut sandbox, test, spec.command.as_deref(), &name)?;
        if verbose {
            eprintln!(
                "[clibate] '{name}': {}",
                if outcome.passed { "ok" } else { "FAILED" }
            );
        }
        cases.push(outcome);
    }

    Ok(RunReport { cases })
}

fn run_one(
    sandbox: &mut Sandbox,
    test: &TestBlock,
    default_command: Option<&str>,
    name: &str,
) -> anyhow::Result<CaseOutcome> {
    let targets: Vec<String> = test.edits.iter().map(|e| e.target_file.clone()).collect();
    let snapshot = sandbox.snapshot(&targets);

    for batch in &test.edits {
        sandbox.apply(&batch.target_file, &batch.ops)?;
    }

    let command = test
        .command
        .as_deref()
        .or(default_command)
        .ok_or_else(|| anyhow::anyhow!("test '{name}' has no command to run"))?;

    let run_result = execute(command, sandbox.root());
    sandbox.restore(snapshot)?;
    let output = run_result?;

    let expect = if output.exit_code == 0 {
        test.success.as_ref()
    } else {
        test.failure.as_ref()
    };

    let failures = expect.map(|e| check_expectations(e, &output)).unwrap_or_default();

    Ok(CaseOutcome {
        name: name.to_string(),
        passed: failures.is_empty(),
        failures,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let dir = std::env::temp_dir();
        let out = execute("echo hello", &dir).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.exit_code, 0);
    }

    #[test]
    fn captures_nonzero_exit() {
        let dir = std::env::temp_dir();
        let out = execute("false", &dir).unwrap();
        assert_ne!(out.exit_code, 0);
    }

    #[test]
    fn empty_command_is_an_error() {
        let dir = std::env::temp_dir();
        assert!(execute("", &dir).is_err());
    }

    #[test]
    fn check_expectations_collects_every_failure() {
        let expect = Expectation {
            exit_code: Some(0),
            stdout: vec![clibate_common::StreamExpectation {
                contains: Some("missing".to_string()),
                ..Default::default()
            }],
            stderr: Vec::new(),
        };
        let output = CommandOutput {
            stdout: "nothing here".to_string(),
            stderr: String::new(),
            exit_code: 1,
        };
        let failures = check_expectations(&expect, &output);
        assert_eq!(failures.len(), 2);
    }
}
