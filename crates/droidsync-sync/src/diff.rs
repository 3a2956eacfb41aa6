//! Diff driver
//!
//! Enumerates the local library, lists the device music directory through
//! the bridge, and hands both sides to the pure plan computation. Under
//! the stronger diff policies, remote sizes or digests are fetched only
//! for name-matching pairs so a large library does not turn into one
//! bridge call per file.

use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use droidsync_core::domain::device::DeviceSession;
use droidsync_core::domain::errors::SyncError;
use droidsync_core::domain::plan::{
    compute_plan, is_audio_file, DiffPolicy, LocalTrack, RemoteTrack, SyncPlan,
};
use droidsync_core::ports::bridge::BridgeClient;
use droidsync_core::DEVICE_MUSIC_DIR;

/// Computes transfer plans for a device session
pub struct DiffDriver {
    bridge: Arc<dyn BridgeClient>,
    policy: DiffPolicy,
}

impl DiffDriver {
    pub fn new(bridge: Arc<dyn BridgeClient>, policy: DiffPolicy) -> Self {
        Self { bridge, policy }
    }

    /// Builds the plan for one sync run: local tracks absent from (or,
    /// under the stronger policies, mismatched with) the device listing.
    pub async fn plan(
        &self,
        session: &DeviceSession,
        local_dir: &Path,
    ) -> Result<SyncPlan, SyncError> {
        let mut local = scan_local_tracks(local_dir).await?;
        let names = self
            .bridge
            .list_remote_dir(session.id(), DEVICE_MUSIC_DIR)
            .await?;

        debug!(
            local = local.len(),
            remote = names.len(),
            policy = %self.policy,
            "Computing plan"
        );

        let mut remote: Vec<RemoteTrack> = names.into_iter().map(RemoteTrack::named).collect();

        if self.policy.needs_size() {
            self.fill_remote_sizes(session, &local, &mut remote).await;
        }
        if self.policy.needs_hash() {
            self.fill_hashes(session, &mut local, &mut remote).await;
        }

        Ok(compute_plan(&local, &remote, self.policy))
    }

    /// Stats name-matching remote files. A failed stat leaves the size
    /// unset, which the policy treats as a name-only match.
    async fn fill_remote_sizes(
        &self,
        session: &DeviceSession,
        local: &[LocalTrack],
        remote: &mut [RemoteTrack],
    ) {
        for track in remote.iter_mut() {
            if !local.iter().any(|l| l.name == track.name) {
                continue;
            }
            let cmd = format!("stat -c %s '{}/{}'", DEVICE_MUSIC_DIR, track.name);
            match self.bridge.run_shell(session.id(), &cmd).await {
                Ok(output) => track.size = output.trim().parse::<u64>().ok(),
                Err(err) => warn!(file = %track.name, %err, "Remote stat failed"),
            }
        }
    }

    /// Digests both sides of every name-matching pair. Either side failing
    /// leaves its hash unset, which the policy treats as a name-only match.
    async fn fill_hashes(
        &self,
        session: &DeviceSession,
        local: &mut [LocalTrack],
        remote: &mut [RemoteTrack],
    ) {
        for track in remote.iter_mut() {
            let Some(counterpart) = local.iter_mut().find(|l| l.name == track.name) else {
                continue;
            };
            let cmd = format!("sha256sum '{}/{}'", DEVICE_MUSIC_DIR, track.name);
            match self.bridge.run_shell(session.id(), &cmd).await {
                Ok(output) => {
                    track.hash = output.split_whitespace().next().map(str::to_string);
                }
                Err(err) => warn!(file = %track.name, %err, "Remote digest failed"),
            }
            match local_sha256(&counterpart.path).await {
                Ok(digest) => counterpart.hash = Some(digest),
                Err(err) => warn!(file = %counterpart.name, %err, "Local digest failed"),
            }
        }
    }
}

/// Enumerates recognized audio files in `dir`, sorted by name.
///
/// Directory-listing order is not guaranteed by the OS; sorting keeps plan
/// order deterministic across runs.
pub async fn scan_local_tracks(dir: &Path) -> Result<Vec<LocalTrack>, SyncError> {
    let io_err = |source| SyncError::LocalFile {
        file: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut tracks = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_audio_file(&name) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(err) => {
                warn!(file = %name, %err, "Skipping unreadable entry");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        tracks.push(LocalTrack {
            name,
            path: entry.path(),
            size: metadata.len(),
            hash: None,
        });
    }

    tracks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tracks)
}

/// SHA-256 hex digest of a local file.
async fn local_sha256(path: &Path) -> Result<String, std::io::Error> {
    let data = tokio::fs::read(path).await?;
    let digest = Sha256::digest(&data);
    Ok(format!("{digest:x}"))
}
