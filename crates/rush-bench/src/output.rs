//! Rendering of benchmark and comparison reports.

use std::io::Write;

use serde::Serialize;

use crate::AppError;
use crate::compare::{ComparisonReport, ExecutorOutcome};
use crate::harness::BenchmarkReport;

/// Writes `value` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<W, T>(writer: &mut W, value: &T) -> Result<(), AppError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *writer, value).map_err(AppError::SerialiseReport)?;
    writeln!(writer).map_err(AppError::WriteOutput)
}

/// Writes the text summary of a single-command run.
pub(crate) fn write_report<W: Write>(
    writer: &mut W,
    report: &BenchmarkReport,
) -> Result<(), AppError> {
    let summary = report.summary();
    let rows = [
        ("Min", summary.min_ms),
        ("Median", summary.median_ms),
        ("Mean", summary.mean_ms),
        ("P95", summary.p95_ms),
        ("P99", summary.p99_ms),
        ("Max", summary.max_ms),
        ("StdDev", summary.std_dev_ms),
    ];
    writeln!(writer, "Command: {}", report.command()).map_err(AppError::WriteOutput)?;
    writeln!(writer, "Iterations: {}", report.iterations()).map_err(AppError::WriteOutput)?;
    for (label, value) in rows {
        writeln!(writer, "  {:<7} {value:.3} ms", format!("{label}:"))
            .map_err(AppError::WriteOutput)?;
    }
    Ok(())
}

/// Writes per-case results and speedups as text.
pub(crate) fn write_comparison<W: Write>(
    writer: &mut W,
    report: &ComparisonReport,
) -> Result<(), AppError> {
    for (case, outcomes) in &report.results {
        writeln!(writer, "{case}").map_err(AppError::WriteOutput)?;
        for (executor, outcome) in outcomes {
            match outcome {
                ExecutorOutcome::Completed { summary } => writeln!(
                    writer,
                    "  {executor:<16} mean {:>9.3} ms  p95 {:>9.3} ms",
                    summary.mean_ms, summary.p95_ms
                ),
                ExecutorOutcome::Failed { error } => {
                    writeln!(writer, "  {executor:<16} FAILED: {error}")
                }
            }
            .map_err(AppError::WriteOutput)?;
        }
        if let Some(speedups) = report.speedups.get(case) {
            for (candidate, speedup) in speedups {
                let verdict = if speedup.wins() { "faster" } else { "not faster" };
                writeln!(
                    writer,
                    "  {candidate} vs {}: {:.2}x ({verdict})",
                    report.reference, speedup.ratio
                )
                .map_err(AppError::WriteOutput)?;
            }
        }
    }
    Ok(())
}
