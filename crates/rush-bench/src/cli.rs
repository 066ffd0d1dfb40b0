//! Command-line arguments for `rush-bench`.

use clap::{Args, Parser, Subcommand};

use crate::compare::BenchmarkCase;
use crate::harness::{DEFAULT_ITERATIONS, DEFAULT_WARMUP};

/// Measures rush daemon round-trip latency.
#[derive(Parser, Debug)]
#[command(
    name = "rush-bench",
    version,
    disable_help_subcommand = true,
    subcommand_negates_reqs = true,
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) run: RunArgs,
    /// Structured subcommands.
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
    /// Shell command line to benchmark, for example `"echo hello"`.
    #[arg(value_name = "COMMAND", required = true)]
    pub(crate) target: Option<String>,
}

/// Repeat counts and output selection shared by every mode.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunArgs {
    /// Number of measured iterations.
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    pub(crate) iterations: usize,
    /// Number of discarded warmup iterations.
    #[arg(short = 'w', long, default_value_t = DEFAULT_WARMUP)]
    pub(crate) warmup: usize,
    /// Emit the report as JSON instead of a text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Compares the daemon against subprocess shells.
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CompareArgs {
    #[command(flatten)]
    pub(crate) run: RunArgs,
    /// Subprocess shell that speedups are measured against.
    #[arg(long, value_name = "SHELL", default_value = "bash")]
    pub(crate) reference: String,
    /// Additional subprocess shell to benchmark; repeatable.
    #[arg(long = "shell", value_name = "SHELL")]
    pub(crate) shells: Vec<String>,
    /// Case to run instead of the default suite; repeatable.
    #[arg(long = "case", value_name = "NAME=COMMAND")]
    pub(crate) cases: Vec<BenchmarkCase>,
}
