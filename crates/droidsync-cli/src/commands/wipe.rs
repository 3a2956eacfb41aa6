//! Destructive commands: clear-and-sync and delete-only
//!
//! The yes/no gate lives here, in the presentation layer; the engine only
//! ever sees a `confirmed` boolean and fails fast when it is false.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::error;

use droidsync_bridge::AdbClient;
use droidsync_core::domain::errors::SyncError;
use droidsync_core::settings::Settings;
use droidsync_sync::engine::{SyncOutcome, TransferOrchestrator};
use droidsync_sync::runner::TaskRunner;

use crate::commands::confirm;
use crate::commands::sync::{format_duration, progress_printer, report_json};
use crate::output::Output;

#[derive(Debug, Args)]
pub struct ClearSyncCommand {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

impl ClearSyncCommand {
    pub async fn execute(&self, out: &Output, settings_path: &Path) -> Result<()> {
        let settings = Settings::load_or_default(settings_path);
        let confirmed =
            self.yes || confirm("This will delete all device music before syncing. Continue?");

        let runner = TaskRunner::new();
        let permit = match runner.begin() {
            Ok(permit) => permit,
            Err(err) => {
                out.error(&err.to_string());
                return Ok(());
            }
        };
        let signal_runner = runner.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_runner.cancel();
            }
        });

        let orchestrator = TransferOrchestrator::new(Arc::new(AdbClient::new()), settings.diff_policy)
            .with_progress(progress_printer(out.is_json()));

        match orchestrator
            .clear_and_sync(&settings.local_dir, confirmed, permit.token())
            .await
        {
            Ok(SyncOutcome::AlreadySynced) => out.success("Device cleared; nothing to sync"),
            Ok(SyncOutcome::Completed(report)) => {
                out.value(&report_json(&report, "completed"));
                out.success(&format!(
                    "Cleared and synced {} track(s) in {}",
                    report.pushed,
                    format_duration(report.duration_ms)
                ));
            }
            Ok(SyncOutcome::Stopped(report)) => {
                out.value(&report_json(&report, "stopped"));
                out.warn(&format!(
                    "Sync stopped: {}/{} track(s) transferred",
                    report.pushed, report.planned
                ));
            }
            Err(SyncError::NotConfirmed) => out.info("Aborted."),
            Err(err) => {
                error!(%err, "Clear and sync failed");
                out.error(&err.to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn execute(&self, out: &Output) -> Result<()> {
        let confirmed = self.yes || confirm("Delete all music files from the device?");

        let runner = TaskRunner::new();
        let _permit = match runner.begin() {
            Ok(permit) => permit,
            Err(err) => {
                out.error(&err.to_string());
                return Ok(());
            }
        };

        let orchestrator =
            TransferOrchestrator::new(Arc::new(AdbClient::new()), Default::default());

        match orchestrator.delete_only(confirmed).await {
            Ok(()) => out.success("Music files deleted"),
            Err(SyncError::NotConfirmed) => out.info("Aborted."),
            Err(err) => {
                error!(%err, "Delete failed");
                out.error(&err.to_string());
            }
        }
        Ok(())
    }
}
