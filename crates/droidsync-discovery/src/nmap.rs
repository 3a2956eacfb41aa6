//! nmap invocation and report parsing

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

use droidsync_core::domain::errors::SyncError;
use droidsync_core::net::ScanRange;
use droidsync_core::ports::scanner::DeviceScanner;
use droidsync_core::BRIDGE_PORT;

/// Marker present on every host line of nmap's normal output.
const SCAN_REPORT_MARKER: &str = "Nmap scan report";

/// Device scanner backed by the `nmap` command-line tool
#[derive(Debug, Clone)]
pub struct NmapScanner {
    program: PathBuf,
}

impl NmapScanner {
    /// Uses `nmap` from `$PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("nmap"),
        }
    }

    /// Uses an explicit nmap binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NmapScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceScanner for NmapScanner {
    async fn scan(&self, range: &ScanRange) -> Result<Vec<String>, SyncError> {
        let port = BRIDGE_PORT.to_string();
        debug!(range = %range, port = %port, "Starting subnet scan");

        let output = Command::new(&self.program)
            .args(["-p", &port, "--open", range.as_str()])
            .output()
            .await
            .map_err(|err| SyncError::ScanFailed(format!("scanner could not be invoked: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SyncError::ScanFailed(stderr));
        }

        let addresses = parse_scan_reports(&String::from_utf8_lossy(&output.stdout));
        info!(range = %range, found = addresses.len(), "Subnet scan finished");
        Ok(addresses)
    }
}

/// Extracts the trailing address token from each scan-report line, in
/// report order. When reverse DNS resolves, nmap prints
/// `Nmap scan report for hostname (192.168.1.42)`; the parentheses are
/// stripped so callers always get a bare address.
fn parse_scan_reports(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains(SCAN_REPORT_MARKER))
        .filter_map(|line| line.split_whitespace().last())
        .map(|token| {
            token
                .trim_start_matches('(')
                .trim_end_matches(')')
                .to_string()
        })
        .collect()
}
