//! Config command - view and edit the persisted settings
//!
//! Every mutation is written straight back to disk, so settings survive
//! between invocations without any daemon holding state.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Subcommand, ValueEnum};

use droidsync_core::domain::plan::DiffPolicy;
use droidsync_core::net::{local_subnet, ScanRange};
use droidsync_core::settings::Settings;

use crate::output::Output;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current settings
    Show,
    /// Set a settings value
    Set {
        key: ConfigKey,
        value: String,
    },
    /// Clear the stored auto-connect endpoints
    ClearIps,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigKey {
    /// Local directory holding the audio library
    LocalDir,
    /// UI theme name (passed through to frontends)
    Theme,
    /// CIDR range scanned for devices
    ScanRange,
    /// Track matching policy: name-only, name-size or name-hash
    DiffPolicy,
}

impl ConfigCommand {
    pub async fn execute(&self, out: &Output, settings_path: &Path) -> Result<()> {
        let mut settings = Settings::load_or_default(settings_path);

        match self {
            ConfigCommand::Show => {
                out.value(&serde_json::json!({
                    "local_dir": &settings.local_dir,
                    "theme": &settings.theme,
                    "auto_connect_ips": &settings.auto_connect_ips,
                    "scan_range": &settings.scan_range,
                    "diff_policy": settings.diff_policy.to_string(),
                }));
                out.success(&format!("Settings ({})", settings_path.display()));
                out.info(&format!("local_dir:        {}", settings.local_dir.display()));
                out.info(&format!("theme:            {}", settings.theme));
                out.info(&format!(
                    "auto_connect_ips: {}",
                    if settings.auto_connect_ips.is_empty() {
                        "(none)".to_string()
                    } else {
                        settings.auto_connect_ips.join(", ")
                    }
                ));
                let scan_range = if settings.scan_range.is_empty() {
                    match local_subnet() {
                        Some(range) => format!("(unset, default would be {range})"),
                        None => "(unset)".to_string(),
                    }
                } else {
                    settings.scan_range.clone()
                };
                out.info(&format!("scan_range:       {scan_range}"));
                out.info(&format!("diff_policy:      {}", settings.diff_policy));
                for issue in settings.validate() {
                    out.warn(&issue.to_string());
                }
            }
            ConfigCommand::Set { key, value } => {
                match key {
                    ConfigKey::LocalDir => {
                        let dir = PathBuf::from(value);
                        if !dir.is_dir() {
                            out.warn(&format!("Directory does not exist: {}", dir.display()));
                        }
                        settings.local_dir = dir;
                    }
                    ConfigKey::Theme => settings.theme = value.clone(),
                    ConfigKey::ScanRange => match ScanRange::new(value.clone()) {
                        Ok(range) => settings.scan_range = range.to_string(),
                        Err(err) => {
                            out.error(&err.to_string());
                            return Ok(());
                        }
                    },
                    ConfigKey::DiffPolicy => match value.parse::<DiffPolicy>() {
                        Ok(policy) => settings.diff_policy = policy,
                        Err(err) => {
                            out.error(&err);
                            return Ok(());
                        }
                    },
                }
                settings.save(settings_path)?;
                out.success("Settings saved");
            }
            ConfigCommand::ClearIps => {
                settings.clear_auto_connect_ips();
                settings.save(settings_path)?;
                out.success("Auto-connect endpoints cleared");
            }
        }
        Ok(())
    }
}
