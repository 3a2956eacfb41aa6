//! Transfer orchestrator behavior against the mock bridge

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use droidsync_core::domain::errors::SyncError;
use droidsync_core::domain::plan::DiffPolicy;
use droidsync_sync::engine::{ProgressEvent, SyncOutcome, TransferOrchestrator};
use droidsync_sync::runner::TaskRunner;

use crate::common::{library_with, MockBridge};

fn orchestrator(bridge: Arc<MockBridge>) -> TransferOrchestrator {
    TransferOrchestrator::new(bridge, DiffPolicy::NameOnly)
}

#[tokio::test]
async fn sync_pushes_only_missing_tracks() {
    let bridge = Arc::new(MockBridge::with_device(&["a.mp3"]));
    let library = library_with(&["a.mp3", "b.mp3"]);

    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let orchestrator = orchestrator(bridge.clone()).with_progress(Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
    }));

    let cancel = CancellationToken::new();
    let outcome = orchestrator
        .sync_new(library.path(), &cancel)
        .await
        .expect("sync");

    let report = match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(report.planned, 1);
    assert_eq!(report.pushed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.bytes_pushed, 10);
    assert_eq!(bridge.pushed_files(), vec!["b.mp3"]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].index, 1);
    assert_eq!(events[0].total, 1);
    assert_eq!(events[0].file, "b.mp3");
    assert!(events[0].kib_per_sec > 0.0);
}

#[tokio::test]
async fn second_sync_is_already_synced() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let library = library_with(&["a.mp3", "b.mp3"]);
    let orchestrator = orchestrator(bridge.clone());
    let cancel = CancellationToken::new();

    let first = orchestrator
        .sync_new(library.path(), &cancel)
        .await
        .expect("first sync");
    assert!(matches!(first, SyncOutcome::Completed(_)));
    assert_eq!(bridge.pushed_files(), vec!["a.mp3", "b.mp3"]);

    let second = orchestrator
        .sync_new(library.path(), &cancel)
        .await
        .expect("second sync");
    assert!(matches!(second, SyncOutcome::AlreadySynced));
    // No further pushes happened.
    assert_eq!(bridge.pushed_files().len(), 2);
}

#[tokio::test]
async fn cancellation_at_item_boundary_reports_stopped() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let library = library_with(&["a.mp3", "b.mp3", "c.mp3"]);

    // Fire the token from the progress callback after the first push: the
    // boundary check before item two must stop the run.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let orchestrator = orchestrator(bridge.clone()).with_progress(Box::new(move |event| {
        if event.index == 1 {
            trigger.cancel();
        }
    }));

    let outcome = orchestrator
        .sync_new(library.path(), &cancel)
        .await
        .expect("sync");

    let report = match outcome {
        SyncOutcome::Stopped(report) => report,
        other => panic!("expected Stopped, got {other:?}"),
    };
    assert_eq!(report.pushed, 1);
    assert_eq!(report.planned, 3);
    assert_eq!(bridge.pushed_files(), vec!["a.mp3"]);
}

#[tokio::test]
async fn push_failure_aborts_remaining_plan() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    *bridge.fail_push.lock().unwrap() = Some("b.mp3".to_string());
    let library = library_with(&["a.mp3", "b.mp3", "c.mp3"]);
    let orchestrator = orchestrator(bridge.clone());

    let err = orchestrator
        .sync_new(library.path(), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        SyncError::TransferFailed { file, .. } => assert_eq!(file, "b.mp3"),
        other => panic!("expected TransferFailed, got {other}"),
    }
    // a.mp3 was pushed and stays pushed; c.mp3 was never attempted.
    let attempts = bridge.pushed_files();
    assert_eq!(attempts, vec!["a.mp3", "b.mp3"]);
    assert!(bridge
        .remote_files
        .lock()
        .unwrap()
        .contains(&"a.mp3".to_string()));
}

#[tokio::test]
async fn vanished_file_is_skipped_not_fatal() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let library = library_with(&["a.mp3", "b.mp3"]);
    // Delete b.mp3 after the plan is computed (on remote listing).
    *bridge.vanish_on_list.lock().unwrap() = Some(library.path().join("b.mp3"));
    let orchestrator = orchestrator(bridge.clone());

    let outcome = orchestrator
        .sync_new(library.path(), &CancellationToken::new())
        .await
        .expect("sync");

    let report = match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(report.pushed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(bridge.pushed_files(), vec!["a.mp3"]);
}

#[tokio::test]
async fn unconfirmed_clear_issues_zero_bridge_calls() {
    let bridge = Arc::new(MockBridge::with_device(&["a.mp3"]));
    let library = library_with(&["a.mp3"]);
    let orchestrator = orchestrator(bridge.clone());

    let err = orchestrator
        .clear_and_sync(library.path(), false, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotConfirmed));
    assert!(bridge.recorded_calls().is_empty());

    let err = orchestrator.delete_only(false).await.unwrap_err();
    assert!(matches!(err, SyncError::NotConfirmed));
    assert!(bridge.recorded_calls().is_empty());
}

#[tokio::test]
async fn clear_and_sync_clears_before_pushing() {
    let bridge = Arc::new(MockBridge::with_device(&["a.mp3"]));
    let library = library_with(&["a.mp3", "b.mp3"]);
    let orchestrator = orchestrator(bridge.clone());

    let outcome = orchestrator
        .clear_and_sync(library.path(), true, &CancellationToken::new())
        .await
        .expect("clear and sync");

    let report = match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected Completed, got {other:?}"),
    };
    // The remote was wiped, so both tracks were pushed back.
    assert_eq!(report.pushed, 2);

    let calls = bridge.recorded_calls();
    let remove_pos = calls
        .iter()
        .position(|c| c.starts_with("remove_all"))
        .expect("remove_all called");
    let first_push = calls
        .iter()
        .position(|c| c.starts_with("push"))
        .expect("push called");
    assert!(remove_pos < first_push, "clear must precede pushes: {calls:?}");
}

#[tokio::test]
async fn delete_only_wipes_without_plan() {
    let bridge = Arc::new(MockBridge::with_device(&["a.mp3", "b.mp3"]));
    let orchestrator = orchestrator(bridge.clone());

    orchestrator.delete_only(true).await.expect("delete");

    assert!(bridge.remote_files.lock().unwrap().is_empty());
    assert!(bridge.recorded_calls().iter().all(|c| !c.starts_with("push")));
}

#[tokio::test]
async fn no_device_fails_fast_with_zero_mutating_calls() {
    let bridge = Arc::new(MockBridge::new());
    let library = library_with(&["a.mp3"]);
    let orchestrator = orchestrator(bridge.clone());
    let cancel = CancellationToken::new();

    let err = orchestrator.sync_new(library.path(), &cancel).await.unwrap_err();
    assert!(matches!(err, SyncError::NoDeviceConnected));

    let err = orchestrator
        .clear_and_sync(library.path(), true, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NoDeviceConnected));

    let err = orchestrator.delete_only(true).await.unwrap_err();
    assert!(matches!(err, SyncError::NoDeviceConnected));

    // Only listing queries were issued, nothing that touches the device.
    assert!(bridge
        .recorded_calls()
        .iter()
        .all(|c| c == "list_devices"));
}

#[tokio::test]
async fn runner_guards_concurrent_submissions() {
    let runner = TaskRunner::new();
    let permit = runner.begin().expect("first task");

    let err = runner.begin().unwrap_err();
    assert!(matches!(err, SyncError::TaskAlreadyRunning));

    drop(permit);
    runner.begin().expect("runner idle again");
}

#[tokio::test]
async fn name_size_policy_replans_mismatched_track() {
    let bridge = Arc::new(MockBridge::with_device(&["a.mp3"]));
    let library = library_with(&["a.mp3"]);
    let orchestrator = TransferOrchestrator::new(bridge.clone(), DiffPolicy::NameSize);

    // Mock stat: run_shell returns empty for stat commands, so the remote
    // size stays unknown and the pair falls back to a name-only match.
    let outcome = orchestrator
        .sync_new(library.path(), &CancellationToken::new())
        .await
        .expect("sync");
    assert!(matches!(outcome, SyncOutcome::AlreadySynced));
}
