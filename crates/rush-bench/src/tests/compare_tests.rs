//! Comparison runs, speedup derivation, and case parsing.

use std::collections::BTreeMap;
use std::time::Duration;

use rstest::rstest;

use super::support::{ScriptedExecutor, failure};
use crate::compare::{
    BenchmarkCase, ComparisonError, ComparisonReport, ComparisonRunner, ExecutorOutcome,
    NamedExecutor, Speedup, default_suite,
};
use crate::executor::MockCommandExecutor;
use crate::harness::HarnessSettings;
use crate::stats::LatencySample;

fn quick() -> HarnessSettings {
    HarnessSettings {
        warmup: 1,
        iterations: 3,
    }
}

fn fixed(name: &str, millis: u64) -> NamedExecutor {
    NamedExecutor::new(
        name,
        Box::new(ScriptedExecutor::succeeding(Duration::from_millis(millis))),
    )
}

/// Succeeds on every command except `broken`, which always fails.
fn failing_for(name: &str, broken: &'static str) -> NamedExecutor {
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().returning(move |command| {
        if command == broken {
            Err(failure(1))
        } else {
            Ok(Duration::from_millis(4))
        }
    });
    NamedExecutor::new(name, Box::new(executor))
}

fn completed(mean: f64) -> ExecutorOutcome {
    let summary = LatencySample::from_unsorted(vec![mean])
        .expect("sample")
        .summary();
    ExecutorOutcome::Completed { summary }
}

#[rstest]
fn faster_candidate_wins_against_reference() {
    let runner = ComparisonRunner::new(quick(), "bash");
    let mut executors = vec![fixed("bash", 10), fixed("rush-daemon", 2)];
    let cases = vec![BenchmarkCase::new("true", "true")];

    let report = runner.run(&cases, &mut executors).expect("comparison");

    let speedup = report.speedups["true"]["rush-daemon"];
    assert!((speedup.ratio - 5.0).abs() < 1e-6);
    assert!(speedup.wins());
    assert!(!report.speedups["true"].contains_key("bash"));
    assert_eq!(report.reference, "bash");
}

#[rstest]
fn case_failed_by_candidate_is_excluded_from_speedups_only() {
    let runner = ComparisonRunner::new(quick(), "bash");
    let mut executors = vec![fixed("bash", 10), failing_for("rush-daemon", "pipe")];
    let cases = vec![
        BenchmarkCase::new("true", "true"),
        BenchmarkCase::new("pipe", "echo hello | cat"),
    ];

    let report = runner.run(&cases, &mut executors).expect("comparison");

    assert!(matches!(
        report.results["pipe"]["rush-daemon"],
        ExecutorOutcome::Failed { .. }
    ));
    assert!(report.results["pipe"]["bash"].summary().is_some());
    assert!(!report.speedups.contains_key("pipe"));
    assert!(report.speedups.contains_key("true"));
}

#[rstest]
fn case_failed_by_reference_is_excluded() {
    let runner = ComparisonRunner::new(quick(), "bash");
    let mut executors = vec![failing_for("bash", "true"), fixed("rush-daemon", 2)];
    let cases = vec![BenchmarkCase::new("true", "true")];

    let report = runner.run(&cases, &mut executors).expect("comparison");

    assert!(report.speedups.is_empty());
    assert_eq!(report.results["true"].len(), 2);
}

#[rstest]
fn speedups_keep_surviving_candidates() {
    let results = BTreeMap::from([(
        String::from("echo"),
        BTreeMap::from([
            (String::from("bash"), completed(6.0)),
            (String::from("rush-daemon"), completed(3.0)),
            (String::from("zsh"), ExecutorOutcome::Failed {
                error: String::from("boom"),
            }),
        ]),
    )]);

    let report = ComparisonReport::from_results("bash", results);

    let echo = &report.speedups["echo"];
    assert_eq!(echo.len(), 1);
    assert!((echo["rush-daemon"].ratio - 2.0).abs() < 1e-9);
}

#[rstest]
#[case(2.0, 4.0, false)]
#[case(4.0, 4.0, false)]
#[case(8.0, 4.0, true)]
fn wins_only_when_ratio_exceeds_one(
    #[case] reference: f64,
    #[case] candidate: f64,
    #[case] expected: bool,
) {
    let speedup = Speedup::between(
        completed(reference).summary().expect("summary"),
        completed(candidate).summary().expect("summary"),
    )
    .expect("positive mean");
    assert_eq!(speedup.wins(), expected);
}

#[rstest]
fn zero_candidate_mean_yields_no_speedup() {
    let reference = completed(1.0);
    let candidate = completed(0.0);
    assert!(
        Speedup::between(
            reference.summary().expect("summary"),
            candidate.summary().expect("summary")
        )
        .is_none()
    );
}

#[rstest]
fn unknown_reference_is_rejected_before_running() {
    let runner = ComparisonRunner::new(quick(), "fish");
    let mut executors = vec![fixed("bash", 1)];

    let error = runner
        .run(&default_suite(), &mut executors)
        .expect_err("unknown reference");

    assert_eq!(error, ComparisonError::UnknownReference(String::from("fish")));
}

#[rstest]
fn duplicate_executor_names_are_rejected() {
    let runner = ComparisonRunner::new(quick(), "bash");
    let mut executors = vec![fixed("bash", 1), fixed("bash", 2)];

    let error = runner
        .run(&default_suite(), &mut executors)
        .expect_err("duplicate");

    assert_eq!(error, ComparisonError::DuplicateExecutor(String::from("bash")));
}

#[rstest]
fn default_suite_covers_daemon_benchmarks() {
    let names: Vec<String> = default_suite().into_iter().map(|case| case.name).collect();
    assert_eq!(names, ["true", "echo_hello", "arithmetic", "pipe"]);
}

#[rstest]
#[case("pipe=echo hello | cat", "pipe", "echo hello | cat")]
#[case("sum=echo $((1+1))", "sum", "echo $((1+1))")]
#[case("env=FOO=bar env", "env", "FOO=bar env")]
fn cases_parse_from_name_equals_command(
    #[case] input: &str,
    #[case] name: &str,
    #[case] command: &str,
) {
    let case: BenchmarkCase = input.parse().expect("valid case");
    assert_eq!(case, BenchmarkCase::new(name, command));
}

#[rstest]
#[case("no-separator")]
#[case("=true")]
#[case("empty=")]
fn malformed_cases_are_rejected(#[case] input: &str) {
    assert!(input.parse::<BenchmarkCase>().is_err());
}

#[rstest]
fn comparison_report_serialises_outcome_status() {
    let results = BTreeMap::from([(
        String::from("true"),
        BTreeMap::from([
            (String::from("bash"), completed(2.0)),
            (String::from("rush-daemon"), ExecutorOutcome::Failed {
                error: String::from("daemon down"),
            }),
        ]),
    )]);
    let value = serde_json::to_value(ComparisonReport::from_results("bash", results))
        .expect("serialise");

    assert_eq!(value["results"]["true"]["bash"]["status"], "completed");
    assert_eq!(value["results"]["true"]["bash"]["mean_ms"], 2.0);
    assert_eq!(value["results"]["true"]["rush-daemon"]["status"], "failed");
    assert_eq!(value["speedups"], serde_json::json!({}));
}
