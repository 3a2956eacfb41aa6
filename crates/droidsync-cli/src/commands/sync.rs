//! Sync command - push local tracks missing from the device

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::error;

use droidsync_bridge::AdbClient;
use droidsync_core::settings::Settings;
use droidsync_sync::connection::ConnectionManager;
use droidsync_sync::diff::DiffDriver;
use droidsync_sync::engine::{ProgressCallback, SyncOutcome, TransferOrchestrator, TransferReport};
use droidsync_sync::runner::TaskRunner;

use crate::output::Output;

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show the plan without pushing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    pub async fn execute(&self, out: &Output, settings_path: &Path) -> Result<()> {
        let settings = Settings::load_or_default(settings_path);
        for issue in settings.validate() {
            out.warn(&issue.to_string());
        }
        let bridge = Arc::new(AdbClient::new());

        if self.dry_run {
            let manager = ConnectionManager::new(bridge.clone());
            let session = match manager.ensure_device().await {
                Ok(session) => session,
                Err(err) => {
                    out.error(&err.to_string());
                    return Ok(());
                }
            };
            let driver = DiffDriver::new(bridge, settings.diff_policy);
            match driver.plan(&session, &settings.local_dir).await {
                Ok(plan) if plan.is_empty() => out.success("All tracks are already synced"),
                Ok(plan) => {
                    out.value(&serde_json::json!({
                        "plan": plan.file_names().collect::<Vec<_>>(),
                        "total_bytes": plan.total_bytes(),
                    }));
                    out.success(&format!("{} track(s) would be pushed:", plan.len()));
                    for name in plan.file_names() {
                        out.info(name);
                    }
                }
                Err(err) => {
                    error!(%err, "Plan computation failed");
                    out.error(&err.to_string());
                }
            }
            return Ok(());
        }

        let runner = TaskRunner::new();
        let permit = match runner.begin() {
            Ok(permit) => permit,
            Err(err) => {
                out.error(&err.to_string());
                return Ok(());
            }
        };

        // Ctrl-C stops at the next plan-item boundary and kills an
        // in-flight push.
        let signal_runner = runner.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_runner.cancel();
            }
        });

        let progress = progress_printer(out.is_json());
        let orchestrator =
            TransferOrchestrator::new(bridge, settings.diff_policy).with_progress(progress);

        match orchestrator
            .sync_new(&settings.local_dir, permit.token())
            .await
        {
            Ok(SyncOutcome::AlreadySynced) => out.success("All tracks are already synced"),
            Ok(SyncOutcome::Completed(report)) => {
                out.value(&report_json(&report, "completed"));
                out.success(&format!(
                    "Sync complete: {} track(s) pushed in {}",
                    report.pushed,
                    format_duration(report.duration_ms)
                ));
                if report.skipped > 0 {
                    out.info(&format!("Skipped: {} vanished track(s)", report.skipped));
                }
            }
            Ok(SyncOutcome::Stopped(report)) => {
                out.value(&report_json(&report, "stopped"));
                out.warn(&format!(
                    "Sync stopped: {}/{} track(s) transferred",
                    report.pushed, report.planned
                ));
            }
            Err(err) => {
                error!(%err, "Sync failed");
                out.error(&err.to_string());
            }
        }
        Ok(())
    }
}

/// Per-file progress lines, matching the selected output format.
pub(crate) fn progress_printer(json: bool) -> ProgressCallback {
    if json {
        Box::new(|event| {
            println!(
                "{}",
                serde_json::json!({
                    "index": event.index,
                    "total": event.total,
                    "file": event.file,
                    "kib_per_sec": event.kib_per_sec,
                })
            );
        })
    } else {
        Box::new(|event| {
            println!(
                "  [{}/{}] {} ({:.2} KiB/s)",
                event.index, event.total, event.file, event.kib_per_sec
            );
        })
    }
}

pub(crate) fn report_json(report: &TransferReport, outcome: &str) -> serde_json::Value {
    serde_json::json!({
        "outcome": outcome,
        "started_at": report.started_at.to_rfc3339(),
        "duration_ms": report.duration_ms,
        "planned": report.planned,
        "pushed": report.pushed,
        "skipped": report.skipped,
        "bytes_pushed": report.bytes_pushed,
    })
}

pub(crate) fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}
