//! Latency samples and their summary statistics.
//!
//! Percentiles use the nearest-rank style index `floor(p * n / 100)` over the
//! ascending sample, computed in integer arithmetic so that, for example,
//! the p95 of 100 samples is always element 95 and never element 94 through
//! floating-point rounding.

use serde::Serialize;
use thiserror::Error;

/// Reasons a set of measurements cannot form a [`LatencySample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    /// No measurements were supplied.
    #[error("latency sample is empty")]
    Empty,
    /// A measurement was NaN or infinite.
    #[error("latency measurement {index} is not a finite number")]
    NonFinite {
        /// Position of the offending value in the input.
        index: usize,
    },
}

/// Non-empty latency measurements in milliseconds, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySample {
    values: Vec<f64>,
}

impl LatencySample {
    /// Sorts `values` and wraps them.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::Empty`] for an empty input and
    /// [`SampleError::NonFinite`] when any value is NaN or infinite.
    pub fn from_unsorted(mut values: Vec<f64>) -> Result<Self, SampleError> {
        if values.is_empty() {
            return Err(SampleError::Empty);
        }
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(SampleError::NonFinite { index });
        }
        values.sort_by(f64::total_cmp);
        Ok(Self { values })
    }

    /// Returns the sorted measurements.
    #[must_use]
    pub const fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Number of measurements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the element at `floor(percent * n / 100)`, clamped to the
    /// last element.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "the rank is defined as a floored integer quotient"
    )]
    pub fn percentile(&self, percent: usize) -> f64 {
        let last = self.values.len().saturating_sub(1);
        let index = (self.values.len().saturating_mul(percent) / 100).min(last);
        self.values.get(index).copied().unwrap_or_default()
    }

    /// Smallest measurement.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or_default()
    }

    /// Largest measurement.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or_default()
    }

    /// Element `n / 2`; the upper middle for even counts.
    #[must_use]
    pub fn median(&self) -> f64 {
        self.percentile(50)
    }

    /// Arithmetic mean.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / as_f64(self.values.len())
    }

    /// Sample standard deviation with an `n - 1` denominator; zero for a
    /// single measurement.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        let count = self.values.len();
        if count < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let squares: f64 = self
            .values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum();
        (squares / as_f64(count - 1)).sqrt()
    }

    /// Derives the summary statistics.
    #[must_use]
    pub fn summary(&self) -> BenchmarkSummary {
        BenchmarkSummary {
            count: self.len(),
            min_ms: self.min(),
            max_ms: self.max(),
            mean_ms: self.mean(),
            median_ms: self.median(),
            p95_ms: self.percentile(95),
            p99_ms: self.percentile(99),
            std_dev_ms: self.std_dev(),
        }
    }

    /// Returns the sorted measurements by value.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

/// Summary statistics of one [`LatencySample`], all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    /// Number of measurements summarised.
    #[serde(skip)]
    pub count: usize,
    /// Fastest run.
    pub min_ms: f64,
    /// Slowest run.
    pub max_ms: f64,
    /// Mean latency.
    pub mean_ms: f64,
    /// Median latency.
    pub median_ms: f64,
    /// 95th percentile latency.
    pub p95_ms: f64,
    /// 99th percentile latency.
    pub p99_ms: f64,
    /// Sample standard deviation.
    pub std_dev_ms: f64,
}

#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts stay far below 2^52"
)]
fn as_f64(count: usize) -> f64 {
    count as f64
}
