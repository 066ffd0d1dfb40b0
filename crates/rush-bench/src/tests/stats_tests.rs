//! Summary statistics over latency samples.

use rstest::rstest;

use crate::stats::{LatencySample, SampleError};

fn sample(values: &[f64]) -> LatencySample {
    LatencySample::from_unsorted(values.to_vec()).expect("valid sample")
}

#[rstest]
fn summary_of_five_values() {
    let summary = sample(&[5.0, 1.0, 3.0, 2.0, 4.0]).summary();

    assert_eq!(summary.count, 5);
    assert_eq!(summary.min_ms, 1.0);
    assert_eq!(summary.max_ms, 5.0);
    assert_eq!(summary.median_ms, 3.0);
    assert!((summary.mean_ms - 3.0).abs() < 1e-9);
    assert_eq!(summary.p95_ms, 5.0);
    assert_eq!(summary.p99_ms, 5.0);
    assert!((summary.std_dev_ms - 2.5_f64.sqrt()).abs() < 1e-9);
}

#[rstest]
fn percentiles_over_one_hundred_values_use_floor_index() {
    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let summary = sample(&values).summary();

    assert_eq!(summary.median_ms, 51.0);
    assert_eq!(summary.p95_ms, 96.0);
    assert_eq!(summary.p99_ms, 100.0);
}

#[rstest]
#[case(&[1.0, 2.0, 3.0, 4.0], 3.0)]
#[case(&[7.0], 7.0)]
#[case(&[2.0, 1.0], 2.0)]
fn median_is_element_at_half_length(#[case] values: &[f64], #[case] expected: f64) {
    assert_eq!(sample(values).median(), expected);
}

#[rstest]
fn sample_is_sorted_ascending() {
    let latencies = sample(&[3.5, 0.25, 2.0]);
    assert_eq!(latencies.as_slice(), &[0.25, 2.0, 3.5]);
    assert_eq!(latencies.len(), 3);
    assert!(!latencies.is_empty());
}

#[rstest]
fn single_value_has_zero_deviation() {
    let summary = sample(&[4.2]).summary();
    assert_eq!(summary.std_dev_ms, 0.0);
    assert_eq!(summary.p99_ms, 4.2);
}

#[rstest]
fn empty_sample_is_rejected() {
    assert_eq!(LatencySample::from_unsorted(Vec::new()), Err(SampleError::Empty));
}

#[rstest]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn non_finite_values_are_rejected(#[case] bad: f64) {
    assert_eq!(
        LatencySample::from_unsorted(vec![1.0, bad, 2.0]),
        Err(SampleError::NonFinite { index: 1 })
    );
}
