//! Cross-executor comparison.
//!
//! Every case is benchmarked on every executor with the same harness
//! settings. A failed run is kept in the raw results but cannot produce a
//! mean, so it never contributes to a speedup. A speedup above one means the
//! candidate was faster than the reference on average; no significance test
//! is applied.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::executor::CommandExecutor;
use crate::harness::{Harness, HarnessSettings};
use crate::stats::BenchmarkSummary;

const COMPARE_TARGET: &str = "rush_bench::compare";

/// A named command to benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkCase {
    /// Key used in reports.
    pub name: String,
    /// Shell command line.
    pub command: String,
}

impl BenchmarkCase {
    /// Creates a case.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Error parsing a `NAME=COMMAND` case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected NAME=COMMAND with a non-empty name and command, got `{0}`")]
pub struct CaseParseError(String);

impl FromStr for BenchmarkCase {
    type Err = CaseParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('=') {
            Some((name, command)) if !name.trim().is_empty() && !command.trim().is_empty() => {
                Ok(Self::new(name.trim(), command))
            }
            _ => Err(CaseParseError(value.to_owned())),
        }
    }
}

/// Commands exercised when no cases are given.
#[must_use]
pub fn default_suite() -> Vec<BenchmarkCase> {
    vec![
        BenchmarkCase::new("true", "true"),
        BenchmarkCase::new("echo_hello", "echo hello"),
        BenchmarkCase::new("arithmetic", "echo $((2+3))"),
        BenchmarkCase::new("pipe", "echo hello | cat"),
    ]
}

/// An executor and the name it reports under.
pub struct NamedExecutor {
    name: String,
    executor: Box<dyn CommandExecutor>,
}

impl NamedExecutor {
    /// Pairs `executor` with `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            name: name.into(),
            executor,
        }
    }

    /// Name used in reports.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl std::fmt::Debug for NamedExecutor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NamedExecutor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Result of one executor on one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutorOutcome {
    /// All calls succeeded.
    Completed {
        /// Summary of the measured latencies.
        #[serde(flatten)]
        summary: BenchmarkSummary,
    },
    /// The run was aborted.
    Failed {
        /// Rendered cause.
        error: String,
    },
}

impl ExecutorOutcome {
    /// Returns the summary of a completed run.
    #[must_use]
    pub const fn summary(&self) -> Option<&BenchmarkSummary> {
        match self {
            Self::Completed { summary } => Some(summary),
            Self::Failed { .. } => None,
        }
    }
}

/// Relative speed of a candidate against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Speedup {
    /// `reference_mean_ms / candidate_mean_ms`.
    pub ratio: f64,
    /// Reference mean latency.
    pub reference_mean_ms: f64,
    /// Candidate mean latency.
    pub candidate_mean_ms: f64,
}

impl Speedup {
    /// Compares two summaries; `None` when the candidate mean is not
    /// positive.
    #[must_use]
    pub fn between(reference: &BenchmarkSummary, candidate: &BenchmarkSummary) -> Option<Self> {
        (candidate.mean_ms > 0.0).then(|| Self {
            ratio: reference.mean_ms / candidate.mean_ms,
            reference_mean_ms: reference.mean_ms,
            candidate_mean_ms: candidate.mean_ms,
        })
    }

    /// `true` when the candidate was faster on average.
    #[must_use]
    pub const fn wins(&self) -> bool {
        self.ratio > 1.0
    }
}

/// Raw results and derived speedups of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Name of the reference executor.
    pub reference: String,
    /// Case name to executor name to outcome.
    pub results: BTreeMap<String, BTreeMap<String, ExecutorOutcome>>,
    /// Case name to candidate name to speedup; cases without a usable pair
    /// are absent.
    pub speedups: BTreeMap<String, BTreeMap<String, Speedup>>,
}

impl ComparisonReport {
    /// Builds a report from raw results, deriving the speedups.
    #[must_use]
    pub fn from_results(
        reference: impl Into<String>,
        results: BTreeMap<String, BTreeMap<String, ExecutorOutcome>>,
    ) -> Self {
        let reference_name = reference.into();
        let speedups = derive_speedups(&reference_name, &results);
        Self {
            reference: reference_name,
            results,
            speedups,
        }
    }
}

fn derive_speedups(
    reference: &str,
    results: &BTreeMap<String, BTreeMap<String, ExecutorOutcome>>,
) -> BTreeMap<String, BTreeMap<String, Speedup>> {
    results
        .iter()
        .filter_map(|(case, outcomes)| {
            let baseline = outcomes.get(reference)?.summary()?;
            let pairs: BTreeMap<String, Speedup> = outcomes
                .iter()
                .filter(|(name, _)| name.as_str() != reference)
                .filter_map(|(name, outcome)| {
                    let speedup = Speedup::between(baseline, outcome.summary()?)?;
                    Some((name.clone(), speedup))
                })
                .collect();
            (!pairs.is_empty()).then(|| (case.clone(), pairs))
        })
        .collect()
}

/// Configuration errors detected before any case runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    /// No executor carries the reference name.
    #[error("reference executor `{0}` is not among the executors")]
    UnknownReference(String),
    /// Two executors share a name.
    #[error("executor name `{0}` is used more than once")]
    DuplicateExecutor(String),
}

/// Runs a case suite across executors.
#[derive(Debug, Clone)]
pub struct ComparisonRunner {
    harness: Harness,
    reference: String,
}

impl ComparisonRunner {
    /// Creates a runner comparing against the executor named `reference`.
    #[must_use]
    pub fn new(settings: HarnessSettings, reference: impl Into<String>) -> Self {
        Self {
            harness: Harness::new(settings),
            reference: reference.into(),
        }
    }

    /// Benchmarks every case on every executor.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonError`] when the executor names are duplicated or
    /// do not include the reference. Individual run failures are recorded in
    /// the report instead.
    pub fn run(
        &self,
        cases: &[BenchmarkCase],
        executors: &mut [NamedExecutor],
    ) -> Result<ComparisonReport, ComparisonError> {
        self.validate(executors)?;

        let mut results: BTreeMap<String, BTreeMap<String, ExecutorOutcome>> = BTreeMap::new();
        for case in cases {
            info!(target: COMPARE_TARGET, case = %case.name, command = %case.command, "benchmarking case");
            let outcomes = results.entry(case.name.clone()).or_default();
            for named in executors.iter_mut() {
                let outcome = match self.harness.run(&mut named.executor, &case.command) {
                    Ok(report) => ExecutorOutcome::Completed {
                        summary: *report.summary(),
                    },
                    Err(error) => {
                        warn!(
                            target: COMPARE_TARGET,
                            case = %case.name,
                            executor = %named.name,
                            %error,
                            "run failed"
                        );
                        ExecutorOutcome::Failed {
                            error: error.to_string(),
                        }
                    }
                };
                outcomes.insert(named.name.clone(), outcome);
            }
        }

        Ok(ComparisonReport::from_results(self.reference.clone(), results))
    }

    fn validate(&self, executors: &[NamedExecutor]) -> Result<(), ComparisonError> {
        let mut seen = BTreeSet::new();
        for named in executors {
            if !seen.insert(named.name()) {
                return Err(ComparisonError::DuplicateExecutor(named.name.clone()));
            }
        }
        if seen.contains(self.reference.as_str()) {
            Ok(())
        } else {
            Err(ComparisonError::UnknownReference(self.reference.clone()))
        }
    }
}
