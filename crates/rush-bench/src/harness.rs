//! Warmup-then-measure latency harness.
//!
//! A run calls the executor `warmup` times and discards those latencies,
//! then calls it `iterations` times and records each one. The report carries
//! the measured latencies sorted ascending. Calls are strictly sequential.
//! The first failure in either phase aborts the run: a sample with silently
//! dropped failures would misstate the latency distribution.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::executor::{CommandExecutor, ExecutionError};
use crate::stats::{BenchmarkSummary, LatencySample, SampleError};

const HARNESS_TARGET: &str = "rush_bench::harness";

/// Default number of discarded warmup calls.
pub const DEFAULT_WARMUP: usize = 5;

/// Default number of measured calls.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Repeat counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Calls made before measuring; their latencies are discarded.
    pub warmup: usize,
    /// Calls measured and summarised.
    pub iterations: usize,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Reasons a run was aborted.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A warmup call failed.
    #[error("warmup failed on iteration {iteration} of {total}: {source}")]
    Warmup {
        /// 1-based index of the failed call.
        iteration: usize,
        /// Configured warmup count.
        total: usize,
        /// Executor failure.
        #[source]
        source: ExecutionError,
    },
    /// A measured call failed.
    #[error(
        "measurement failed on iteration {iteration} of {total} \
         ({completed} completed samples discarded): {source}"
    )]
    Measurement {
        /// 1-based index of the failed call.
        iteration: usize,
        /// Configured iteration count.
        total: usize,
        /// Samples recorded before the failure, none of which are reported.
        completed: usize,
        /// Executor failure.
        #[source]
        source: ExecutionError,
    },
    /// Zero iterations cannot be summarised.
    #[error("at least one measured iteration is required")]
    NoIterations,
    /// The recorded latencies were not usable.
    #[error("invalid latency sample: {0}")]
    Sample(#[from] SampleError),
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    command: String,
    iterations: usize,
    times_ms: Vec<f64>,
    #[serde(flatten)]
    summary: BenchmarkSummary,
}

impl BenchmarkReport {
    /// Command that was measured.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Number of measured calls.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Measured latencies, sorted ascending.
    #[must_use]
    pub fn times_ms(&self) -> &[f64] {
        self.times_ms.as_slice()
    }

    /// Summary statistics of the measured latencies.
    #[must_use]
    pub const fn summary(&self) -> &BenchmarkSummary {
        &self.summary
    }
}

/// Drives an executor through warmup and measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Harness {
    settings: HarnessSettings,
}

impl Harness {
    /// Creates a harness with `settings`.
    #[must_use]
    pub const fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    /// Returns the repeat counts.
    #[must_use]
    pub const fn settings(&self) -> HarnessSettings {
        self.settings
    }

    /// Benchmarks `command` on `executor`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NoIterations`] before calling the executor
    /// when no iterations are configured, and the phase, iteration, and cause
    /// of the first failed call otherwise.
    pub fn run<E>(&self, executor: &mut E, command: &str) -> Result<BenchmarkReport, HarnessError>
    where
        E: CommandExecutor + ?Sized,
    {
        let HarnessSettings { warmup, iterations } = self.settings;
        if iterations == 0 {
            return Err(HarnessError::NoIterations);
        }

        info!(target: HARNESS_TARGET, command, warmup, "starting warmup");
        for iteration in 1..=warmup {
            let elapsed = executor.execute(command).map_err(|source| {
                error!(target: HARNESS_TARGET, command, iteration, %source, "warmup aborted");
                HarnessError::Warmup {
                    iteration,
                    total: warmup,
                    source,
                }
            })?;
            debug!(target: HARNESS_TARGET, iteration, elapsed_ms = millis(elapsed), "warmup call");
        }

        info!(target: HARNESS_TARGET, command, iterations, "starting measurement");
        let mut times_ms = Vec::with_capacity(iterations);
        for iteration in 1..=iterations {
            let completed = times_ms.len();
            let elapsed = executor.execute(command).map_err(|source| {
                error!(target: HARNESS_TARGET, command, iteration, %source, "measurement aborted");
                HarnessError::Measurement {
                    iteration,
                    total: iterations,
                    completed,
                    source,
                }
            })?;
            let elapsed_ms = millis(elapsed);
            debug!(target: HARNESS_TARGET, iteration, elapsed_ms, "measured call");
            times_ms.push(elapsed_ms);
        }

        let sample = LatencySample::from_unsorted(times_ms)?;
        let summary = sample.summary();
        info!(
            target: HARNESS_TARGET,
            command,
            mean_ms = summary.mean_ms,
            p95_ms = summary.p95_ms,
            "measurement complete"
        );
        Ok(BenchmarkReport {
            command: command.to_owned(),
            iterations,
            times_ms: sample.into_vec(),
            summary,
        })
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
