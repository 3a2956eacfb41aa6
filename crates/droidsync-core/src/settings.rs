//! Persisted settings record
//!
//! A single JSON document under the XDG config directory, read once at
//! process start and written back after every mutating settings action.
//! Concurrency is by convention: only the supervisory (CLI) context writes
//! settings, never a worker task.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::plan::DiffPolicy;
use crate::net::ScanRange;

/// Persisted configuration for droidsync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Local directory holding the audio library
    pub local_dir: PathBuf,
    /// UI theme name; stored and passed through, never interpreted here
    pub theme: String,
    /// Network endpoints to reconnect to on startup, duplicate-free
    #[serde(default)]
    pub auto_connect_ips: Vec<String>,
    /// CIDR range scanned for devices; empty until first configured
    #[serde(default)]
    pub scan_range: String,
    /// How local tracks are matched against same-named remote files
    #[serde(default)]
    pub diff_policy: DiffPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local_dir: dirs::audio_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
                .unwrap_or_else(|| PathBuf::from("~/Music")),
            theme: "darkly".to_string(),
            auto_connect_ips: Vec::new(),
            scan_range: String::new(),
            diff_policy: DiffPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Try to load from `path`; fall back to [`Settings::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write settings to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Platform-appropriate default path for the settings file.
    ///
    /// Typically `$XDG_CONFIG_HOME/droidsync/settings.json` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("droidsync")
            .join("settings.json")
    }

    /// Validate the settings and return all errors found.
    ///
    /// An empty vector means the settings are valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // Check local_dir only when it does not start with `~` (tilde is
        // expanded at runtime).
        let dir_str = self.local_dir.to_string_lossy();
        if !dir_str.starts_with('~') && !self.local_dir.is_dir() {
            errors.push(ValidationError {
                field: "local_dir".into(),
                message: format!("directory does not exist: {}", self.local_dir.display()),
            });
        }

        if !self.scan_range.is_empty() {
            if let Err(err) = ScanRange::new(self.scan_range.clone()) {
                errors.push(ValidationError {
                    field: "scan_range".into(),
                    message: err.to_string(),
                });
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for ip in &self.auto_connect_ips {
            if seen.contains(&ip.as_str()) {
                errors.push(ValidationError {
                    field: "auto_connect_ips".into(),
                    message: format!("duplicate entry: {ip}"),
                });
            }
            seen.push(ip);
        }

        errors
    }

    /// Validated scan range, or `None` while unset or malformed.
    pub fn parsed_scan_range(&self) -> Option<ScanRange> {
        if self.scan_range.is_empty() {
            None
        } else {
            ScanRange::new(self.scan_range.clone()).ok()
        }
    }

    /// Appends an auto-connect endpoint unless already present.
    ///
    /// Returns true if the list changed.
    pub fn add_auto_connect_ip(&mut self, ip: impl Into<String>) -> bool {
        let ip = ip.into();
        if self.auto_connect_ips.contains(&ip) {
            return false;
        }
        self.auto_connect_ips.push(ip);
        true
    }

    /// Empties the auto-connect list.
    pub fn clear_auto_connect_ips(&mut self) {
        self.auto_connect_ips.clear();
    }
}

/// A single validation error found in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable explanation
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
