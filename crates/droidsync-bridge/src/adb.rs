//! adb invocation and output parsing
//!
//! Exit code and stdout are the only signals consulted. Device-side shell
//! output arrives with CRLF line endings on older bridge versions, so every
//! line is stripped of a trailing `\r` before use.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use droidsync_core::domain::device::{DeviceId, DeviceState};
use droidsync_core::domain::errors::SyncError;
use droidsync_core::ports::bridge::{BridgeClient, DeviceEntry, PushOutcome};

/// Bridge client backed by the `adb` command-line tool
#[derive(Debug, Clone)]
pub struct AdbClient {
    program: PathBuf,
}

impl AdbClient {
    /// Uses `adb` from `$PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("adb"),
        }
    }

    /// Uses an explicit adb binary, e.g. from a bundled platform-tools.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output(&self, args: &[&str]) -> Result<std::process::Output, SyncError> {
        debug!(tool = %self.program.display(), ?args, "Invoking bridge tool");
        Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(SyncError::BridgeUnavailable)
    }

    /// Runs a device-targeted command, mapping a dropped device to
    /// [`SyncError::DeviceUnreachable`].
    async fn device_output(
        &self,
        device: &DeviceId,
        tool: &'static str,
        args: &[&str],
    ) -> Result<String, SyncError> {
        let output = self.output(args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_gone_marker(&stderr) {
            warn!(device = %device, %stderr, "Device dropped mid-call");
            return Err(SyncError::DeviceUnreachable(device.to_string()));
        }
        Err(SyncError::ToolFailed {
            tool,
            status: output.status.code().unwrap_or(-1),
            stderr,
        })
    }
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BridgeClient for AdbClient {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>, SyncError> {
        let output = self.output(&["devices"]).await?;
        // Non-zero exit on a listing is "no results", not an error.
        if !output.status.success() {
            return Ok(Vec::new());
        }
        Ok(parse_device_listing(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn get_property(&self, device: &DeviceId, key: &str) -> Result<String, SyncError> {
        let stdout = self
            .device_output(
                device,
                "adb shell getprop",
                &["-s", device.as_str(), "shell", "getprop", key],
            )
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn run_shell(&self, device: &DeviceId, cmd: &str) -> Result<String, SyncError> {
        self.device_output(device, "adb shell", &["-s", device.as_str(), "shell", cmd])
            .await
    }

    async fn list_remote_dir(
        &self,
        device: &DeviceId,
        path: &str,
    ) -> Result<Vec<String>, SyncError> {
        let output = self
            .output(&["-s", device.as_str(), "shell", &format!("ls {path}")])
            .await?;
        // Absent directory: indistinguishable from an empty one, by design.
        if !output.status.success() {
            return Ok(Vec::new());
        }
        Ok(parse_remote_listing(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn push(
        &self,
        device: &DeviceId,
        local: &Path,
        remote_dir: &str,
        cancel: &CancellationToken,
    ) -> Result<PushOutcome, SyncError> {
        let local_str = local.to_string_lossy();
        debug!(device = %device, file = %local_str, remote_dir, "Starting push");

        let mut child = Command::new(&self.program)
            .args(["-s", device.as_str(), "push", &local_str, remote_dir])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(SyncError::BridgeUnavailable)?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(SyncError::BridgeUnavailable)?;
                if status.success() {
                    return Ok(PushOutcome::Completed);
                }
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    pipe.read_to_string(&mut stderr).await.ok();
                }
                let stderr = stderr.trim().to_string();
                if is_gone_marker(&stderr) {
                    return Err(SyncError::DeviceUnreachable(device.to_string()));
                }
                Err(SyncError::ToolFailed {
                    tool: "adb push",
                    status: status.code().unwrap_or(-1),
                    stderr,
                })
            }
            _ = cancel.cancelled() => {
                warn!(device = %device, file = %local_str, "Push cancelled, terminating child");
                child.kill().await.ok();
                Ok(PushOutcome::Interrupted)
            }
        }
    }

    async fn remove_all(&self, device: &DeviceId, path: &str) -> Result<(), SyncError> {
        // `rm -f` makes the unmatched-glob case succeed, so clearing an
        // already-empty directory is idempotent.
        self.device_output(
            device,
            "adb shell rm",
            &["-s", device.as_str(), "shell", &format!("rm -rf {path}/*")],
        )
        .await?;
        Ok(())
    }

    async fn connect_network(&self, address: &str) -> Result<(), SyncError> {
        let output = self.output(&["connect", address]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SyncError::ToolFailed {
                tool: "adb connect",
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn disconnect_network(&self) -> Result<(), SyncError> {
        let output = self.output(&["disconnect"]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SyncError::ToolFailed {
                tool: "adb disconnect",
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Stderr markers that mean the device is gone rather than the tool broken.
fn is_gone_marker(stderr: &str) -> bool {
    stderr.contains("not found") || stderr.contains("offline") || stderr.contains("closed")
}

/// Parses `adb devices` output: one `<id>\t<state>` line per device after
/// the header. Lines whose state token is not a known keyword (the header
/// itself, daemon startup notices, blanks) are skipped.
fn parse_device_listing(stdout: &str) -> Vec<DeviceEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let state = DeviceState::from_keyword(parts.next()?)?;
            Some(DeviceEntry {
                id: DeviceId::from(id),
                state,
            })
        })
        .collect()
}

/// Parses `ls` output from the device shell into file names.
fn parse_remote_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        // Old bridges report a missing directory on stdout with exit 0.
        .filter(|line| !line.contains("No such file or directory"))
        .map(str::to_string)
        .collect()
}
