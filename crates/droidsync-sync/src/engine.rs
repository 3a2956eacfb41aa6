//! Transfer orchestrator
//!
//! Drives the cancellable, strictly sequential transfer of a computed plan:
//! `idle -> running -> {completed | stopped | failed}`. Files are pushed in
//! plan order, progress events are emitted in that same order, and the
//! cancellation token is checked once per plan item on top of the
//! hard-terminate race inside the bridge adapter. Partial progress is never
//! rolled back.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use droidsync_core::domain::device::DeviceSession;
use droidsync_core::domain::errors::SyncError;
use droidsync_core::domain::plan::{DiffPolicy, SyncPlan};
use droidsync_core::ports::bridge::{BridgeClient, PushOutcome};
use droidsync_core::DEVICE_MUSIC_DIR;

use crate::connection::ConnectionManager;
use crate::diff::DiffDriver;

/// Per-file progress notification
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 1-based position in the plan
    pub index: usize,
    /// Plan length
    pub total: usize,
    /// File name just transferred
    pub file: String,
    /// Throughput of this transfer
    pub kib_per_sec: f64,
}

/// Callback invoked after each successful push, in plan order
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Accounting for one finished (or stopped) run
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Plan length at computation time
    pub planned: usize,
    /// Files that arrived on the device
    pub pushed: u32,
    /// Files that vanished locally between planning and transfer
    pub skipped: u32,
    pub bytes_pushed: u64,
}

/// Terminal state of a sync run
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The plan was empty; nothing to do
    AlreadySynced,
    /// Every plan item was processed
    Completed(TransferReport),
    /// Cancellation ended the run early; remaining items were left unsynced
    Stopped(TransferReport),
}

/// Orchestrates sync, clear and delete operations against one device
pub struct TransferOrchestrator {
    bridge: Arc<dyn BridgeClient>,
    connection: ConnectionManager,
    diff: DiffDriver,
    progress: Option<ProgressCallback>,
}

impl TransferOrchestrator {
    pub fn new(bridge: Arc<dyn BridgeClient>, policy: DiffPolicy) -> Self {
        Self {
            connection: ConnectionManager::new(bridge.clone()),
            diff: DiffDriver::new(bridge.clone(), policy),
            bridge,
            progress: None,
        }
    }

    /// Installs the per-file progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Pushes every local track missing from the device.
    ///
    /// Asserts a ready device first and fails fast with
    /// [`SyncError::NoDeviceConnected`] before any other bridge traffic.
    /// An empty plan is a success with zero work.
    pub async fn sync_new(
        &self,
        local_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        let session = self.connection.ensure_device().await?;
        let plan = self.diff.plan(&session, local_dir).await?;

        if plan.is_empty() {
            info!(device = %session.id(), "All tracks already synced");
            return Ok(SyncOutcome::AlreadySynced);
        }

        info!(
            device = %session.id(),
            files = plan.len(),
            bytes = plan.total_bytes(),
            "Starting transfer"
        );
        self.run_plan(&session, &plan, cancel).await
    }

    /// Clears the device music directory, then syncs.
    ///
    /// `confirmed` must be true before anything is touched: an unconfirmed
    /// call fails with [`SyncError::NotConfirmed`] and issues zero bridge
    /// calls. A failed clear prevents the sync.
    pub async fn clear_and_sync(
        &self,
        local_dir: &Path,
        confirmed: bool,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        if !confirmed {
            return Err(SyncError::NotConfirmed);
        }
        let session = self.connection.ensure_device().await?;
        info!(device = %session.id(), "Clearing device music directory");
        self.bridge
            .remove_all(session.id(), DEVICE_MUSIC_DIR)
            .await?;
        self.sync_new(local_dir, cancel).await
    }

    /// Deletes everything in the device music directory, no plan involved.
    pub async fn delete_only(&self, confirmed: bool) -> Result<(), SyncError> {
        if !confirmed {
            return Err(SyncError::NotConfirmed);
        }
        let session = self.connection.ensure_device().await?;
        info!(device = %session.id(), "Deleting device music files");
        self.bridge
            .remove_all(session.id(), DEVICE_MUSIC_DIR)
            .await
    }

    async fn run_plan(
        &self,
        session: &DeviceSession,
        plan: &SyncPlan,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        let started_at = Utc::now();
        let run_start = Instant::now();
        let total = plan.len();
        let mut pushed: u32 = 0;
        let mut skipped: u32 = 0;
        let mut bytes_pushed: u64 = 0;

        let report = |pushed, skipped, bytes_pushed| TransferReport {
            started_at,
            duration_ms: run_start.elapsed().as_millis() as u64,
            planned: total,
            pushed,
            skipped,
            bytes_pushed,
        };

        for (i, track) in plan.tracks().iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    device = %session.id(),
                    pushed,
                    remaining = total - i,
                    "Transfer stopped"
                );
                return Ok(SyncOutcome::Stopped(report(pushed, skipped, bytes_pushed)));
            }

            // The plan was computed earlier; the file may have vanished
            // since. That is a per-file failure, not fatal to the run.
            if let Err(err) = tokio::fs::metadata(&track.path).await {
                warn!(file = %track.name, %err, "Local file gone, skipping");
                skipped += 1;
                continue;
            }

            let push_start = Instant::now();
            match self
                .bridge
                .push(session.id(), &track.path, DEVICE_MUSIC_DIR, cancel)
                .await
            {
                Ok(PushOutcome::Completed) => {
                    let secs = push_start.elapsed().as_secs_f64().max(1e-3);
                    let kib_per_sec = track.size as f64 / 1024.0 / secs;
                    pushed += 1;
                    bytes_pushed += track.size;
                    info!(
                        file = %track.name,
                        index = i + 1,
                        total,
                        kib_per_sec,
                        "Pushed"
                    );
                    if let Some(callback) = &self.progress {
                        callback(&ProgressEvent {
                            index: i + 1,
                            total,
                            file: track.name.clone(),
                            kib_per_sec,
                        });
                    }
                }
                Ok(PushOutcome::Interrupted) => {
                    info!(device = %session.id(), pushed, "Transfer stopped mid-push");
                    return Ok(SyncOutcome::Stopped(report(pushed, skipped, bytes_pushed)));
                }
                Err(cause) => {
                    // A race: the token may have fired while the push was
                    // failing for its own reasons. Cancellation wins.
                    if cancel.is_cancelled() {
                        return Ok(SyncOutcome::Stopped(report(pushed, skipped, bytes_pushed)));
                    }
                    return Err(SyncError::TransferFailed {
                        file: track.name.clone(),
                        cause: Box::new(cause),
                    });
                }
            }
        }

        info!(device = %session.id(), pushed, skipped, "Transfer complete");
        Ok(SyncOutcome::Completed(report(pushed, skipped, bytes_pushed)))
    }
}
