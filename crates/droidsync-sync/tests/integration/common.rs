//! Shared test helpers
//!
//! [`MockBridge`] simulates the device side in memory: a device listing, a
//! flat remote file set that push and remove mutate, and a call journal so
//! tests can assert exactly which bridge operations an operation issued.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use droidsync_core::domain::device::{DeviceId, DeviceState};
use droidsync_core::domain::errors::SyncError;
use droidsync_core::ports::bridge::{BridgeClient, DeviceEntry, PushOutcome};

pub struct MockBridge {
    pub devices: Mutex<Vec<DeviceEntry>>,
    pub remote_files: Mutex<Vec<String>>,
    /// Journal of bridge operations, in call order
    pub calls: Mutex<Vec<String>>,
    /// File name whose push should fail
    pub fail_push: Mutex<Option<String>>,
    /// Local path deleted when the remote dir is listed, simulating a file
    /// vanishing between plan computation and transfer
    pub vanish_on_list: Mutex<Option<PathBuf>>,
    /// Whether `connect_network` makes the endpoint appear in the listing
    pub connect_succeeds: bool,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            remote_files: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_push: Mutex::new(None),
            vanish_on_list: Mutex::new(None),
            connect_succeeds: true,
        }
    }

    /// A mock with one ready USB device and the given remote files.
    pub fn with_device(remote_files: &[&str]) -> Self {
        let mock = Self::new();
        mock.devices.lock().unwrap().push(DeviceEntry {
            id: DeviceId::from("emulator-5554"),
            state: DeviceState::Device,
        });
        *mock.remote_files.lock().unwrap() =
            remote_files.iter().map(|s| s.to_string()).collect();
        mock
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushed_files(&self) -> Vec<String> {
        self.recorded_calls()
            .iter()
            .filter_map(|c| c.strip_prefix("push ").map(str::to_string))
            .collect()
    }
}

#[async_trait::async_trait]
impl BridgeClient for MockBridge {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>, SyncError> {
        self.record("list_devices");
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn get_property(&self, _device: &DeviceId, key: &str) -> Result<String, SyncError> {
        self.record(format!("get_property {key}"));
        Ok("Pixel 7".to_string())
    }

    async fn run_shell(&self, _device: &DeviceId, cmd: &str) -> Result<String, SyncError> {
        self.record(format!("shell {cmd}"));
        if cmd == "ip route" {
            return Ok(
                "192.168.1.0/24 dev wlan0 proto kernel scope link src 192.168.1.42\n".to_string(),
            );
        }
        Ok(String::new())
    }

    async fn list_remote_dir(
        &self,
        _device: &DeviceId,
        _path: &str,
    ) -> Result<Vec<String>, SyncError> {
        self.record("list_remote_dir");
        if let Some(path) = self.vanish_on_list.lock().unwrap().take() {
            std::fs::remove_file(path).ok();
        }
        Ok(self.remote_files.lock().unwrap().clone())
    }

    async fn push(
        &self,
        _device: &DeviceId,
        local: &Path,
        _remote_dir: &str,
        cancel: &CancellationToken,
    ) -> Result<PushOutcome, SyncError> {
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("push {name}"));

        if cancel.is_cancelled() {
            return Ok(PushOutcome::Interrupted);
        }
        if self.fail_push.lock().unwrap().as_deref() == Some(name.as_str()) {
            return Err(SyncError::ToolFailed {
                tool: "adb push",
                status: 1,
                stderr: "remote write failed".to_string(),
            });
        }
        self.remote_files.lock().unwrap().push(name);
        Ok(PushOutcome::Completed)
    }

    async fn remove_all(&self, _device: &DeviceId, path: &str) -> Result<(), SyncError> {
        self.record(format!("remove_all {path}"));
        self.remote_files.lock().unwrap().clear();
        Ok(())
    }

    async fn connect_network(&self, address: &str) -> Result<(), SyncError> {
        self.record(format!("connect {address}"));
        if self.connect_succeeds {
            self.devices.lock().unwrap().push(DeviceEntry {
                id: DeviceId::from(address),
                state: DeviceState::Device,
            });
        }
        Ok(())
    }

    async fn disconnect_network(&self) -> Result<(), SyncError> {
        self.record("disconnect");
        self.devices
            .lock()
            .unwrap()
            .retain(|e| !e.id.as_str().contains(':'));
        Ok(())
    }
}

/// Writes `files` into a fresh temp dir and returns its handle.
pub fn library_with(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create temp library");
    for name in files {
        std::fs::write(dir.path().join(name), b"0123456789").expect("write track");
    }
    dir
}
