//! Error types for the benchmark runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::compare::ComparisonError;
use crate::harness::HarnessError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("benchmark aborted: {0}")]
    Benchmark(#[from] HarnessError),
    #[error("comparison could not start: {0}")]
    Comparison(#[from] ComparisonError),
    #[error("failed to serialise report: {0}")]
    SerialiseReport(serde_json::Error),
    #[error("failed to write report: {0}")]
    WriteOutput(io::Error),
}
