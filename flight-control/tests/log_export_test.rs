//! Passenger log export through the background runner.
//!
//! Covers the submit, poll pending, poll complete flow, the file layout of
//! the exported artifact, and ordering against registrations that race with
//! an export.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use flight_control::{FlightControl, LogWriter, PassengerLog};
use flight_control_core::environment::Clock;
use flight_control_runtime::{OperationRunner, OperationStatus, RunnerConfig};
use flight_control_testing::helpers::init_test_tracing;
use flight_control_testing::{ManualClock, test_clock};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_export_submit_poll_complete() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("static").join("log").join("passengers.csv");

    // Writer held back so the export stays pending until released
    let (writer, task) = LogWriter::channel(PassengerLog::new(&path));
    let control = FlightControl::with_log_writer(writer, OperationRunner::new(test_clock()));

    control.add_passenger("Elon".into(), "Musk".into()).await;
    control.add_passenger("Yuri".into(), "Gagarin".into()).await;

    let id = control.submit_log_export();

    let first = control.poll_operation(id).unwrap();
    assert_eq!(first.id, id);
    assert!(matches!(first.status, OperationStatus::Pending));
    assert!(!first.is_done());
    assert!(first.result().is_none());
    assert!(!path.exists());

    tokio::task::spawn_blocking(move || task.run());

    let finished = control.wait_operation(id, WAIT).await.unwrap();
    let artifact = finished.result().unwrap();
    assert_eq!(artifact.path, path);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "name;surname\nElon;Musk\nYuri;Gagarin\n"
    );

    // Stable under repeated polling
    for _ in 0..5 {
        assert_eq!(control.poll_operation(id).unwrap(), finished);
    }
}

#[tokio::test]
async fn test_second_export_rewrites_whole_file() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passengers.csv");
    let control = FlightControl::new(PassengerLog::new(&path), OperationRunner::new(test_clock()));
    control.initialize_log().await.unwrap();

    control.add_passenger("Sally".into(), "Ride".into()).await;
    let id = control.submit_log_export();
    control.wait_operation(id, WAIT).await.unwrap();

    control.add_passenger("Mae".into(), "Jemison".into()).await;
    let id = control.submit_log_export();
    control.wait_operation(id, WAIT).await.unwrap();
    control.flush_log().await.unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "name;surname\nSally;Ride\nMae;Jemison\n"
    );
}

/// A passenger registered right after an export is submitted must survive
/// the rewrite, whichever of the two reaches the writer first.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_racing_an_export_is_kept() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passengers.csv");
    let control = Arc::new(FlightControl::new(
        PassengerLog::new(&path),
        OperationRunner::new(test_clock()),
    ));
    control.initialize_log().await.unwrap();

    let mut expected = String::from("name;surname\n");
    for round in 0..50 {
        for seat in 0..20 {
            control.add_passenger(format!("Crew{round}x{seat}"), "Early".into()).await;
            expected.push_str(&format!("Crew{round}x{seat};Early\n"));
        }

        let id = control.submit_log_export();
        control.add_passenger(format!("Crew{round}"), "Late".into()).await;
        expected.push_str(&format!("Crew{round};Late\n"));

        control.wait_operation(id, WAIT).await.unwrap();
        control.flush_log().await.unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(
            contents.contains(&format!("Crew{round};Late\n")),
            "round {round}: late registration missing from {contents:?}"
        );
        assert_eq!(contents, expected, "round {round}");
    }
}

#[tokio::test]
async fn test_failed_export_is_reported_done() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("log");
    fs::write(&blocker, "not a directory").unwrap();

    let control = FlightControl::new(
        PassengerLog::new(blocker.join("passengers.csv")),
        OperationRunner::new(test_clock()),
    );

    let id = control.submit_log_export();
    let operation = control.wait_operation(id, WAIT).await.unwrap();

    assert!(operation.is_done());
    assert!(operation.result().is_none());
    assert!(operation.error().unwrap().contains("Failed to write passenger log"));
    assert!(!control.health().is_healthy());
}

#[tokio::test]
async fn test_finished_exports_expire() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(test_clock().now());
    let runner = OperationRunner::with_config(
        clock.clone(),
        RunnerConfig::default().with_completed_ttl(Some(Duration::from_secs(600))),
    );
    let control = FlightControl::new(PassengerLog::new(dir.path().join("passengers.csv")), runner);

    let id = control.submit_log_export();
    control.wait_operation(id, WAIT).await.unwrap();

    clock.advance(Duration::from_secs(601));
    assert_eq!(control.exports().evict_expired(), 1);
    assert!(control.poll_operation(id).is_err());
}
