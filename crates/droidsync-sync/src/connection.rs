//! Connection manager
//!
//! Converts a raw device identifier or address into a verified
//! [`DeviceSession`], and answers "is anything connected right now?" for
//! the orchestrated operations. The bridge's own device list is the
//! durable record between invocations; every operation re-derives its
//! session from a fresh listing rather than trusting stale state.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{info, warn};

use droidsync_core::domain::device::{Device, DeviceId, DeviceSession};
use droidsync_core::domain::errors::SyncError;
use droidsync_core::ports::bridge::BridgeClient;
use droidsync_core::BRIDGE_PORT;

/// Property key holding the device's marketing name.
const MODEL_PROPERTY: &str = "ro.product.model";

/// Informational snapshot of the currently connected device
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    pub device: DeviceId,
    /// Device-side IP, parsed from a shell route query
    pub ip: Option<String>,
    pub model: Option<String>,
}

/// Establishes and verifies device sessions over the bridge port
pub struct ConnectionManager {
    bridge: Arc<dyn BridgeClient>,
}

impl ConnectionManager {
    pub fn new(bridge: Arc<dyn BridgeClient>) -> Self {
        Self { bridge }
    }

    /// Connects to `target` (a USB serial, an `ip:port` endpoint, or a bare
    /// IPv4 address) and returns a verified session.
    ///
    /// For a bare IP the existing network session is dropped first, then a
    /// fresh `connect` is issued against the bridge port. In every case the
    /// identifier must then appear in a new listing with state `device`;
    /// otherwise the attempt is rejected, leaving whatever partial state
    /// the bridge reached (no rollback). Connecting to an already-current
    /// device re-verifies rather than short-circuiting.
    pub async fn connect(&self, target: &str) -> Result<DeviceSession, SyncError> {
        let expected_id = if target.parse::<Ipv4Addr>().is_ok() {
            let address = format!("{target}:{BRIDGE_PORT}");
            info!(%address, "Opening network session");
            self.bridge.disconnect_network().await?;
            self.bridge.connect_network(&address).await?;
            address
        } else {
            target.to_string()
        };

        let entries = self.bridge.list_devices().await?;
        let entry = entries
            .iter()
            .find(|e| e.id.as_str() == expected_id && e.state.is_ready())
            .ok_or_else(|| SyncError::ConnectionRejected(target.to_string()))?;

        // Best-effort: a failed name fetch must not fail the connect.
        let model = self
            .bridge
            .get_property(&entry.id, MODEL_PROPERTY)
            .await
            .unwrap_or_default();

        let device = Device::from_id(entry.id.clone()).with_model(model);
        info!(device = %device.label(), "Connected");
        Ok(DeviceSession::new(device))
    }

    /// Returns a session for the first ready device, or
    /// [`SyncError::NoDeviceConnected`].
    ///
    /// This is the precondition every orchestrated operation asserts before
    /// doing any work.
    pub async fn ensure_device(&self) -> Result<DeviceSession, SyncError> {
        let entries = self.bridge.list_devices().await?;
        entries
            .into_iter()
            .find(|e| e.state.is_ready())
            .map(|e| DeviceSession::new(Device::from_id(e.id)))
            .ok_or(SyncError::NoDeviceConnected)
    }

    /// Reports on the currently connected device, enriched with its IP and
    /// model name. Purely informational; mutates nothing.
    pub async fn check_connection(&self) -> Result<Option<ConnectionReport>, SyncError> {
        let entries = self.bridge.list_devices().await?;
        let Some(entry) = entries.into_iter().find(|e| e.state.is_ready()) else {
            return Ok(None);
        };

        let ip = match self.bridge.run_shell(&entry.id, "ip route").await {
            Ok(output) => parse_route_ip(&output),
            Err(err) => {
                warn!(device = %entry.id, %err, "Route query failed");
                None
            }
        };
        let model = self
            .bridge
            .get_property(&entry.id, MODEL_PROPERTY)
            .await
            .ok()
            .filter(|m| !m.is_empty());

        Ok(Some(ConnectionReport {
            device: entry.id,
            ip,
            model,
        }))
    }
}

/// Pulls the device's own address out of `ip route` output.
///
/// The link-route line reads
/// `192.168.1.0/24 dev wlan0 proto kernel scope link src <ip>`; the
/// address is the ninth whitespace token of the output.
fn parse_route_ip(output: &str) -> Option<String> {
    output.split_whitespace().nth(8).map(str::to_string)
}
