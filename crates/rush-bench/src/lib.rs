//! Latency benchmarking for the rush shell daemon.
//!
//! The crate measures how long the daemon takes to serve one complete
//! request over its Unix socket, from before connecting until the response
//! has been decoded. [`client::DaemonClient`] performs a single exchange,
//! [`harness::Harness`] repeats it through a warmup and a measurement phase,
//! and [`compare::ComparisonRunner`] pits the daemon against subprocess
//! shells.
//!
//! ```no_run
//! use rush_bench::client::{ClientSettings, DaemonClient};
//! use rush_bench::executor::DaemonExecutor;
//! use rush_bench::harness::{Harness, HarnessSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DaemonClient::new(ClientSettings::new("/home/me/.rush/daemon.sock"));
//! let mut executor = DaemonExecutor::new(client);
//! let report = Harness::new(HarnessSettings::default()).run(&mut executor, "echo hello")?;
//! println!("p95: {:.3} ms", report.summary().p95_ms);
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use rush_bench_config::Config;

pub mod client;
pub mod compare;
pub mod executor;
pub mod harness;
pub mod stats;
pub mod telemetry;

mod cli;
mod config;
mod errors;
mod output;
mod transport;

#[cfg(test)]
mod tests;

use cli::{Cli, CliCommand, CompareArgs, RunArgs};
use client::{ClientSettings, DaemonClient};
use compare::{ComparisonRunner, NamedExecutor, default_suite};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{command_arguments, split_config_arguments};
pub(crate) use errors::AppError;
use executor::{DAEMON_EXECUTOR_NAME, DaemonExecutor, SubprocessExecutor};
use harness::{Harness, HarnessSettings};

/// Runs the benchmark tool with `args`, writing reports to `stdout` and
/// diagnostics to `stderr`.
///
/// Returns [`ExitCode::SUCCESS`] when the run completed and
/// [`ExitCode::FAILURE`] otherwise; an aborted run writes no report.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&arguments);

    let cli = match Cli::try_parse_from(command_arguments(&arguments, split.command_start)) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return match write!(stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report_failure(stderr, &AppError::CliUsage(error)),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            execute(&cli, &config, stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_failure(stderr, &error),
    }
}

fn report_failure<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    if let AppError::CliUsage(usage) = error {
        drop(write!(stderr, "{usage}"));
    } else {
        drop(writeln!(stderr, "error: {error}"));
    }
    ExitCode::FAILURE
}

fn execute<W: Write>(cli: &Cli, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    let client = DaemonClient::new(ClientSettings::from_config(config));
    match (&cli.command, &cli.target) {
        (Some(CliCommand::Compare(args)), _) => run_comparison(args, client, config, stdout),
        (None, Some(target)) => run_single(cli.run, client, target, stdout),
        (None, None) => Err(AppError::CliUsage(clap::Error::raw(
            ErrorKind::MissingRequiredArgument,
            "a command to benchmark is required\n",
        ))),
    }
}

fn harness_settings(run: RunArgs) -> HarnessSettings {
    HarnessSettings {
        warmup: run.warmup,
        iterations: run.iterations,
    }
}

fn run_single<W: Write>(
    run: RunArgs,
    client: DaemonClient,
    target: &str,
    stdout: &mut W,
) -> Result<(), AppError> {
    let mut executor = DaemonExecutor::new(client);
    let report = Harness::new(harness_settings(run)).run(&mut executor, target)?;
    if run.json {
        output::write_json(stdout, &report)
    } else {
        output::write_report(stdout, &report)
    }
}

fn run_comparison<W: Write>(
    args: &CompareArgs,
    client: DaemonClient,
    config: &Config,
    stdout: &mut W,
) -> Result<(), AppError> {
    let cases = if args.cases.is_empty() {
        default_suite()
    } else {
        args.cases.clone()
    };

    let mut executors = vec![NamedExecutor::new(
        DAEMON_EXECUTOR_NAME,
        Box::new(DaemonExecutor::new(client).with_exit_status_check()),
    )];
    for shell in std::iter::once(&args.reference).chain(&args.shells) {
        let mut subprocess = SubprocessExecutor::new(shell.as_str());
        if let Some(limit) = config.timeout().filter(|limit| !limit.is_zero()) {
            subprocess = subprocess.with_timeout(limit);
        }
        executors.push(NamedExecutor::new(shell.as_str(), Box::new(subprocess)));
    }

    let runner = ComparisonRunner::new(harness_settings(args.run), args.reference.as_str());
    let report = runner.run(&cases, &mut executors)?;
    if args.run.json {
        output::write_json(stdout, &report)
    } else {
        output::write_comparison(stdout, &report)
    }
}
