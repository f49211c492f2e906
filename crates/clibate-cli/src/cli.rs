//! `clibate run`/`clibate check` entry points (SPEC_FULL §4.9): flag
//! parsing, human-readable and JSON reporting. Errors are rendered in the
//! bit-stable diagnostic format to stderr, matching the teacher crate's
//! `[tokf] ...`-prefixed `eprintln!` logging convention rather than a
//! tracing subscriber.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::document::parse_spec_file;
use crate::runner::run_spec;

#[derive(Parser)]
#[command(name = "clibate", version, about = "Black-box CLI integration testing")]
pub struct Cli {
    /// Disable ANSI color in human-readable output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print per-test-block progress lines to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a spec file and run every `test:` block it declares
    Run {
        /// Path to the `.clib` spec file
        spec_file: PathBuf,
        /// Print the run report as JSON instead of a human-readable summary
        #[arg(long)]
        json: bool,
    },
    /// Parse a spec file (and every file it includes) without running anything
    Check {
        /// Path to the `.clib` spec file
        spec_file: PathBuf,
    },
}

/// Convert a command's `anyhow::Result<i32>` into the process exit code,
/// printing the error to stderr first if it failed.
fn or_exit(r: anyhow::Result<i32>) -> i32 {
    r.unwrap_or_else(|e| {
        eprintln!("[clibate] error: {e:#}");
        1
    })
}

/// Run the CLI and return the process exit code.
#[must_use]
pub fn run(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Run { spec_file, json } => or_exit(cmd_run(spec_file, *json, cli.verbose)),
        Commands::Check { spec_file } => cmd_check(spec_file),
    }
}

fn cmd_run(spec_file: &Path, json: bool, verbose: bool) -> anyhow::Result<i32> {
    let spec = parse_spec_file(spec_file).map_err(|e| anyhow::anyhow!("{e}"))?;
    let report = run_spec(&spec, verbose)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for case in &report.cases {
            if case.passed {
                println!("ok   {}", case.name);
            } else {
                println!("FAIL {}", case.name);
                for failure in &case.failures {
                    println!("       {failure}");
                }
            }
        }
        let total = report.cases.len();
        let passed = report.cases.iter().filter(|c| c.passed).count();
        println!("{passed}/{total} tests passed");
    }

    Ok(i32::from(!report.all_passed()))
}

fn cmd_check(spec_file: &Path) -> i32 {
    match parse_spec_file(spec_file) {
        Ok(spec) => {
            eprintln!(
                "[clibate] {} is valid ({} file(s), {} test(s))",
                spec_file.display(),
                spec.files.len(),
                spec.tests.len()
            );
            0
        }
        Err(e) => {
            eprint!("{e}");
            1
        }
    }
}
