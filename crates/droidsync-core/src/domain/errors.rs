//! Error taxonomy
//!
//! Every failure an orchestrated operation can surface is a variant here.
//! All variants are terminal to the operation that raised them: there is no
//! automatic retry anywhere in the core, and partial progress (files already
//! pushed, remote files already removed) is never rolled back.

use std::io;

use thiserror::Error;

/// Errors surfaced by sync, connection and discovery operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The bridge binary is missing or could not be spawned.
    #[error("bridge tool could not be invoked")]
    BridgeUnavailable(#[source] io::Error),

    /// The device dropped while an operation was talking to it.
    #[error("device '{0}' became unreachable")]
    DeviceUnreachable(String),

    /// Precondition failure: no device reports state `device`.
    #[error("no device connected")]
    NoDeviceConnected,

    /// A connect attempt did not result in a visible device.
    #[error("connection to '{0}' was rejected: device did not appear in the bridge listing")]
    ConnectionRejected(String),

    /// The network scanner failed or could not be invoked.
    #[error("network scan failed: {0}")]
    ScanFailed(String),

    /// A push failed mid-plan; remaining plan items are abandoned.
    #[error("transfer of '{file}' failed")]
    TransferFailed {
        file: String,
        #[source]
        cause: Box<SyncError>,
    },

    /// A destructive operation was invoked without confirmation.
    #[error("destructive operation was not confirmed")]
    NotConfirmed,

    /// A second task was submitted while one was active.
    #[error("a task is already running")]
    TaskAlreadyRunning,

    /// A scan range string is not valid IPv4 CIDR notation.
    #[error("invalid scan range '{0}'")]
    InvalidScanRange(String),

    /// An external tool exited unsuccessfully.
    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: i32,
        stderr: String,
    },

    /// A local file could not be read or inspected.
    #[error("local file error for '{file}'")]
    LocalFile {
        file: String,
        #[source]
        source: io::Error,
    },
}
