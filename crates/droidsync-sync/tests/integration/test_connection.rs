//! Connection manager behavior against the mock bridge

use std::sync::Arc;

use droidsync_core::domain::device::ConnectionKind;
use droidsync_core::domain::errors::SyncError;
use droidsync_sync::connection::ConnectionManager;

use crate::common::MockBridge;

#[tokio::test]
async fn bare_ip_disconnects_then_connects_on_bridge_port() {
    let bridge = Arc::new(MockBridge::new());
    let manager = ConnectionManager::new(bridge.clone());

    let session = manager.connect("192.168.1.42").await.expect("connect");

    assert_eq!(session.id().as_str(), "192.168.1.42:5555");
    assert_eq!(session.device().kind(), ConnectionKind::Network);
    assert_eq!(session.device().model(), Some("Pixel 7"));

    let calls = bridge.recorded_calls();
    assert_eq!(calls[0], "disconnect");
    assert_eq!(calls[1], "connect 192.168.1.42:5555");
    assert!(calls.contains(&"list_devices".to_string()));
}

#[tokio::test]
async fn connect_rejected_when_device_never_appears() {
    let mut bridge = MockBridge::new();
    bridge.connect_succeeds = false;
    let manager = ConnectionManager::new(Arc::new(bridge));

    let err = manager.connect("192.168.1.42").await.unwrap_err();
    match err {
        SyncError::ConnectionRejected(target) => assert_eq!(target, "192.168.1.42"),
        other => panic!("expected ConnectionRejected, got {other}"),
    }
}

#[tokio::test]
async fn serial_connect_reverifies_without_network_calls() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let manager = ConnectionManager::new(bridge.clone());

    let session = manager.connect("emulator-5554").await.expect("connect");
    assert_eq!(session.id().as_str(), "emulator-5554");
    assert_eq!(session.device().kind(), ConnectionKind::Usb);

    let calls = bridge.recorded_calls();
    assert!(!calls.iter().any(|c| c.starts_with("connect ")));
    assert!(!calls.iter().any(|c| c == "disconnect"));
}

#[tokio::test]
async fn connect_to_unknown_serial_is_rejected() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let manager = ConnectionManager::new(bridge);

    let err = manager.connect("R58M-UNKNOWN").await.unwrap_err();
    assert!(matches!(err, SyncError::ConnectionRejected(_)));
}

#[tokio::test]
async fn ensure_device_requires_ready_state() {
    let bridge = Arc::new(MockBridge::new());
    let manager = ConnectionManager::new(bridge);

    let err = manager.ensure_device().await.unwrap_err();
    assert!(matches!(err, SyncError::NoDeviceConnected));

    let bridge = Arc::new(MockBridge::with_device(&[]));
    let manager = ConnectionManager::new(bridge);
    let session = manager.ensure_device().await.expect("device present");
    assert_eq!(session.id().as_str(), "emulator-5554");
}

#[tokio::test]
async fn check_connection_enriches_with_ip_and_model() {
    let bridge = Arc::new(MockBridge::with_device(&[]));
    let manager = ConnectionManager::new(bridge.clone());

    let report = manager
        .check_connection()
        .await
        .expect("check")
        .expect("device present");

    assert_eq!(report.device.as_str(), "emulator-5554");
    assert_eq!(report.ip.as_deref(), Some("192.168.1.42"));
    assert_eq!(report.model.as_deref(), Some("Pixel 7"));

    // Informational only: nothing was connected, removed or pushed.
    let calls = bridge.recorded_calls();
    assert!(calls
        .iter()
        .all(|c| c == "list_devices" || c.starts_with("shell") || c.starts_with("get_property")));
}

#[tokio::test]
async fn check_connection_none_when_no_device() {
    let bridge = Arc::new(MockBridge::new());
    let manager = ConnectionManager::new(bridge);

    let report = manager.check_connection().await.expect("check");
    assert!(report.is_none());
}
