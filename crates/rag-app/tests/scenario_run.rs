//! End-to-end scenario runs through the rag-app service layer.

use std::path::PathBuf;

use rag_app::{AppError, Session, Severity, load_scenario, parse_scenario, to_json};
use rag_graph::{ProcessStatus, ResourceStatus};

fn demo(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // go to crates
    path.pop(); // go to repo root
    path.push("demos");
    path.push(name);
    path
}

#[test]
fn crossed_waits_deadlock() {
    let scenario = load_scenario(&demo("crossed_waits.yaml")).expect("load demo");
    let report = Session::run(&scenario).unwrap();

    assert!(report.steps.iter().all(|s| s.outcome.severity != Severity::Warning));
    let notices: Vec<_> = report.notices().collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(report.steps[5].notice.as_ref().unwrap().episode, 1);

    let last = report.steps.last().unwrap();
    assert_eq!(last.outcome.severity, Severity::Error);
    assert!(last.outcome.message.starts_with("Deadlock found:"));

    assert!(report.detection.is_deadlocked());
    let explanation = report.detection.explanation.as_ref().unwrap();
    assert_eq!(explanation.release_candidates.len(), 2);

    for row in &report.summary.processes {
        assert_eq!(row.status, ProcessStatus::Waiting);
    }
    for row in &report.summary.resources {
        assert_eq!(row.status, ResourceStatus::Allocated);
        assert_eq!(row.usage(), "1/1");
    }
}

#[test]
fn spare_capacity_is_not_reported() {
    let scenario = load_scenario(&demo("spare_capacity.yaml")).expect("load demo");
    assert_eq!(scenario.monitor.poll_interval_ms, 1000);

    let report = Session::run(&scenario).unwrap();
    assert_eq!(report.notices().count(), 0);
    assert!(!report.detection.is_deadlocked());
    assert_eq!(
        report.steps.last().unwrap().outcome.message,
        "No deadlock detected."
    );
    assert_eq!(report.summary.resource("R1").unwrap().usage(), "1/2");
}

#[test]
fn recovery_reports_two_episodes() {
    let scenario = load_scenario(&demo("recovery.yaml")).expect("load demo");
    let report = Session::run(&scenario).unwrap();

    let episodes: Vec<(usize, u64)> = report
        .notices()
        .zip(report.steps.iter().filter(|s| s.notice.is_some()))
        .map(|(n, s)| (s.index, n.episode))
        .collect();
    assert_eq!(episodes, vec![(9, 1), (12, 2)]);

    // Invalid instance count surfaces as an error without adding the node.
    let bad = &report.steps[12];
    assert_eq!(bad.outcome.severity, Severity::Error);
    assert!(report.summary.resource("W").is_none());
    assert!(report.detection.is_deadlocked());
}

#[test]
fn report_serializes_to_json() {
    let scenario = load_scenario(&demo("crossed_waits.yaml")).unwrap();
    let report = Session::run(&scenario).unwrap();
    let json = to_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["name"], "crossed waits");
    assert_eq!(value["steps"][0]["step"]["op"], "request");
    assert_eq!(value["detection"]["deadlock"].as_array().unwrap().len(), 4);
    assert_eq!(value["summary"]["resources"][0]["status"], "Allocated");
}

#[test]
fn duplicate_declarations_fail_the_run() {
    let scenario = parse_scenario("processes: [P1]\nresources: [{name: P1}]\n").unwrap();
    assert!(matches!(
        Session::run(&scenario),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = load_scenario(&demo("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, AppError::ScenarioRead { .. }));
    assert!(err.to_string().contains("does_not_exist.yaml"));
}
