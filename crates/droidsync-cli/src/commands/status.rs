//! Status command - report the connected device

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::error;

use droidsync_bridge::AdbClient;
use droidsync_sync::connection::ConnectionManager;

use crate::output::Output;

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, out: &Output) -> Result<()> {
        let manager = ConnectionManager::new(Arc::new(AdbClient::new()));

        match manager.check_connection().await {
            Ok(Some(report)) => {
                out.value(&serde_json::json!({
                    "device": report.device.as_str(),
                    "ip": &report.ip,
                    "model": &report.model,
                }));
                let mut line = format!("Connected to: {}", report.device);
                if let Some(ip) = &report.ip {
                    line = format!("Connected to: {ip}");
                }
                if let Some(model) = &report.model {
                    line.push_str(&format!(" ({model})"));
                }
                out.success(&line);
            }
            Ok(None) => out.error("No device connected"),
            Err(err) => {
                error!(%err, "Connection check failed");
                out.error(&err.to_string());
            }
        }
        Ok(())
    }
}
