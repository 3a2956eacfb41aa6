//! Bridge client port
//!
//! Interface to the external debug-bridge tool. The adapter owns invocation
//! and output parsing; exit code and stdout are the only signals consulted.
//!
//! ## Design Notes
//!
//! - Every method returns the core [`SyncError`] taxonomy so the engine can
//!   react to `BridgeUnavailable` / `DeviceUnreachable` without inspecting
//!   adapter-specific errors.
//! - `push` takes the cancellation token directly: a fired token must
//!   hard-terminate the in-flight child process, which only the adapter
//!   can do.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::domain::device::{DeviceId, DeviceState};
use crate::domain::errors::SyncError;

/// One line of the bridge device listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub id: DeviceId,
    pub state: DeviceState,
}

/// How a push ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The file arrived on the device
    Completed,
    /// The cancellation token fired and the transfer was terminated
    Interrupted,
}

/// Port trait for debug-bridge operations
#[async_trait::async_trait]
pub trait BridgeClient: Send + Sync {
    /// Lists devices known to the bridge.
    ///
    /// A non-zero exit on the listing command is treated as "no results",
    /// not an error; only a failure to invoke the tool at all is
    /// [`SyncError::BridgeUnavailable`].
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>, SyncError>;

    /// Reads a system property from the device, trimmed.
    async fn get_property(&self, device: &DeviceId, key: &str) -> Result<String, SyncError>;

    /// Runs a shell command on the device and returns its raw output.
    async fn run_shell(&self, device: &DeviceId, cmd: &str) -> Result<String, SyncError>;

    /// Lists the file names in a directory on the device.
    ///
    /// An empty or absent directory yields an empty vector; the two cases
    /// are deliberately indistinguishable.
    async fn list_remote_dir(&self, device: &DeviceId, path: &str)
        -> Result<Vec<String>, SyncError>;

    /// Pushes a local file into a directory on the device.
    ///
    /// Blocks until the transfer completes or `cancel` fires, in which case
    /// the child process is killed and `Interrupted` is returned.
    async fn push(
        &self,
        device: &DeviceId,
        local: &Path,
        remote_dir: &str,
        cancel: &CancellationToken,
    ) -> Result<PushOutcome, SyncError>;

    /// Recursively removes `path/*` on the device. Idempotent: removing an
    /// already-empty directory succeeds.
    async fn remove_all(&self, device: &DeviceId, path: &str) -> Result<(), SyncError>;

    /// Opens a network session to `address` (`ip:port`), independent of any
    /// USB session.
    async fn connect_network(&self, address: &str) -> Result<(), SyncError>;

    /// Drops all network sessions.
    async fn disconnect_network(&self) -> Result<(), SyncError>;
}
