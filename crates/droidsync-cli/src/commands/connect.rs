//! Connect command - establish a verified device session

use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::error;

use droidsync_bridge::AdbClient;
use droidsync_core::settings::Settings;
use droidsync_sync::connection::ConnectionManager;

use crate::output::Output;

#[derive(Debug, Args)]
pub struct ConnectCommand {
    /// Device address or serial; omitted to replay stored endpoints
    pub target: Option<String>,
}

impl ConnectCommand {
    pub async fn execute(&self, out: &Output, settings_path: &Path) -> Result<()> {
        let mut settings = Settings::load_or_default(settings_path);
        let manager = ConnectionManager::new(Arc::new(AdbClient::new()));

        match &self.target {
            Some(target) => {
                match manager.connect(target).await {
                    Ok(session) => {
                        out.value(&serde_json::json!({
                            "device": session.id().as_str(),
                            "model": session.device().model(),
                        }));
                        out.success(&format!("Connected to: {}", session.device().label()));

                        // Remember network endpoints for next startup.
                        if target.parse::<Ipv4Addr>().is_ok()
                            && settings.add_auto_connect_ip(target.clone())
                        {
                            if let Err(err) = settings.save(settings_path) {
                                out.warn(&format!("Could not save settings: {err}"));
                            }
                        }
                    }
                    Err(err) => {
                        error!(%err, %target, "Connection failed");
                        out.error(&err.to_string());
                    }
                }
            }
            None => {
                if settings.auto_connect_ips.is_empty() {
                    out.error("No stored endpoints. Run 'droidsync scan' first.");
                    return Ok(());
                }
                for ip in settings.auto_connect_ips.clone() {
                    match manager.connect(&ip).await {
                        Ok(session) => {
                            out.success(&format!("Connected to: {}", session.device().label()));
                        }
                        Err(err) => {
                            error!(%err, %ip, "Auto-connect failed");
                            out.warn(&format!("{ip}: {err}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
