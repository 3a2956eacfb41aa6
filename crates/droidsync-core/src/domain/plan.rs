//! Track model, diff policies and plan computation
//!
//! The plan is the policy-aware set difference `local − remote`, keyed by
//! file name. The default [`DiffPolicy::NameOnly`] reproduces the historic
//! behavior: two files with the same name are considered the same track
//! regardless of content. The stronger policies additionally require a size
//! or content-hash match for same-name pairs; when the remote side of a
//! comparison is unavailable (stat or hash failed), the pair falls back to
//! a name-only match rather than re-pushing on missing metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Audio file extensions recognized in the local directory.
///
/// Matching is a case-sensitive suffix check.
pub const AUDIO_EXTENSIONS: &[&str] = &[".m4a", ".mp3"];

/// Returns true if `name` carries a recognized audio extension.
#[must_use]
pub fn is_audio_file(name: &str) -> bool {
    AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// A file in the local library directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    /// File name, the diff key
    pub name: String,
    /// Absolute path, re-validated at transfer time
    pub path: PathBuf,
    /// Size in bytes at enumeration time
    pub size: u64,
    /// SHA-256 hex digest, computed only under [`DiffPolicy::NameHash`]
    /// and only for tracks whose name also appears remotely
    pub hash: Option<String>,
}

/// A file in the device music directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub name: String,
    /// Size in bytes, fetched only under [`DiffPolicy::NameSize`]
    pub size: Option<u64>,
    /// SHA-256 hex digest, fetched only under [`DiffPolicy::NameHash`]
    pub hash: Option<String>,
}

impl RemoteTrack {
    /// A remote track known by name alone.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            hash: None,
        }
    }
}

/// How a local track is matched against a same-named remote track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffPolicy {
    /// Same name means already synced (historic behavior)
    #[default]
    NameOnly,
    /// Same name and same byte size
    NameSize,
    /// Same name and same SHA-256 digest
    NameHash,
}

impl DiffPolicy {
    /// Whether planning needs remote sizes for name-matching pairs.
    #[must_use]
    pub fn needs_size(&self) -> bool {
        matches!(self, DiffPolicy::NameSize)
    }

    /// Whether planning needs digests for name-matching pairs.
    #[must_use]
    pub fn needs_hash(&self) -> bool {
        matches!(self, DiffPolicy::NameHash)
    }

    /// Returns true if `remote` satisfies `local` under this policy.
    ///
    /// Only called for name-matching pairs. Missing remote metadata counts
    /// as a match so that a failed stat or digest never triggers a re-push.
    #[must_use]
    pub fn matches(&self, local: &LocalTrack, remote: &RemoteTrack) -> bool {
        debug_assert_eq!(local.name, remote.name);
        match self {
            DiffPolicy::NameOnly => true,
            DiffPolicy::NameSize => remote.size.map_or(true, |s| s == local.size),
            DiffPolicy::NameHash => match (&local.hash, &remote.hash) {
                (Some(l), Some(r)) => l == r,
                _ => true,
            },
        }
    }
}

impl std::fmt::Display for DiffPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiffPolicy::NameOnly => "name-only",
            DiffPolicy::NameSize => "name-size",
            DiffPolicy::NameHash => "name-hash",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DiffPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name-only" => Ok(DiffPolicy::NameOnly),
            "name-size" => Ok(DiffPolicy::NameSize),
            "name-hash" => Ok(DiffPolicy::NameHash),
            other => Err(format!(
                "unknown diff policy '{other}'; valid options: name-only, name-size, name-hash"
            )),
        }
    }
}

/// The ordered set of tracks slated for transfer in one sync run
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    tracks: Vec<LocalTrack>,
}

impl SyncPlan {
    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.tracks.iter().map(|t| t.size).sum()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.name.as_str())
    }
}

/// Computes the transfer plan: local tracks with no satisfying remote
/// counterpart under `policy`, sorted by name for determinism.
#[must_use]
pub fn compute_plan(local: &[LocalTrack], remote: &[RemoteTrack], policy: DiffPolicy) -> SyncPlan {
    let mut tracks: Vec<LocalTrack> = local
        .iter()
        .filter(|track| {
            match remote.iter().find(|r| r.name == track.name) {
                Some(counterpart) => !policy.matches(track, counterpart),
                None => true,
            }
        })
        .cloned()
        .collect();
    tracks.sort_by(|a, b| a.name.cmp(&b.name));
    SyncPlan { tracks }
}
