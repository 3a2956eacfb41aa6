//! Scan command - discover devices with bridge networking enabled

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use droidsync_core::net::{local_subnet, ScanRange};
use droidsync_core::ports::scanner::DeviceScanner;
use droidsync_core::settings::Settings;
use droidsync_discovery::NmapScanner;

use crate::commands::prompt_for_text;
use crate::output::Output;

#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Scan this CIDR range instead of the configured one
    #[arg(long)]
    pub range: Option<String>,
}

impl ScanCommand {
    pub async fn execute(&self, out: &Output, settings_path: &Path) -> Result<()> {
        let mut settings = Settings::load_or_default(settings_path);

        let range = match self.resolve_range(out, &mut settings, settings_path) {
            Some(range) => range,
            None => {
                out.error("A valid scan range is required (e.g. 192.168.1.0/24)");
                return Ok(());
            }
        };

        out.info(&format!("Scanning {range} for bridge port..."));
        let scanner = NmapScanner::new();
        let addresses = match scanner.scan(&range).await {
            Ok(addresses) => addresses,
            Err(err) => {
                tracing::error!(%err, "Scan failed");
                out.error(&err.to_string());
                return Ok(());
            }
        };

        if addresses.is_empty() {
            out.error("No devices with bridge networking found");
            return Ok(());
        }

        info!(count = addresses.len(), "Scan found devices");
        out.value(&serde_json::json!({ "devices": &addresses }));
        out.success(&format!("Found {} device(s):", addresses.len()));
        for address in &addresses {
            out.info(address);
        }
        out.info("Connect with: droidsync connect <address>");
        Ok(())
    }

    /// Range priority: `--range` flag, then settings, then an interactive
    /// prompt (defaulting to the workstation's own /24) that persists the
    /// answer.
    fn resolve_range(
        &self,
        out: &Output,
        settings: &mut Settings,
        settings_path: &Path,
    ) -> Option<ScanRange> {
        if let Some(range) = &self.range {
            return match ScanRange::new(range.clone()) {
                Ok(range) => Some(range),
                Err(err) => {
                    out.error(&err.to_string());
                    None
                }
            };
        }

        if let Some(range) = settings.parsed_scan_range() {
            return Some(range);
        }

        let default = local_subnet().map(|r| r.to_string()).unwrap_or_default();
        loop {
            let answer =
                prompt_for_text("Network scan range (e.g. 192.168.1.0/24)", &default)?;
            match ScanRange::new(answer) {
                Ok(range) => {
                    settings.scan_range = range.to_string();
                    if let Err(err) = settings.save(settings_path) {
                        out.warn(&format!("Could not save settings: {err}"));
                    }
                    return Some(range);
                }
                Err(err) => out.error(&err.to_string()),
            }
        }
    }
}
