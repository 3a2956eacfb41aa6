//! Device scanner port
//!
//! Interface to the external network scanner used for discovery. Callers
//! pre-validate the range by constructing a [`ScanRange`]; no timeout is
//! enforced here, the external tool's own timeout governs the wall-clock
//! bound.

use crate::domain::errors::SyncError;
use crate::net::ScanRange;

/// Port trait for subnet scanning
#[async_trait::async_trait]
pub trait DeviceScanner: Send + Sync {
    /// Scans `range` for hosts exposing the bridge network port and returns
    /// their addresses in report order.
    async fn scan(&self, range: &ScanRange) -> Result<Vec<String>, SyncError>;
}
