//! Entrypoint for the `rush-bench` latency benchmark.
//!
//! Delegates to [`rush_bench::run`], which loads configuration, parses the
//! command line, drives the benchmark, and prints the report.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    rush_bench::run(std::env::args_os(), &mut stdout, &mut stderr)
}
