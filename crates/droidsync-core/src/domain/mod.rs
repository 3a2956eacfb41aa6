//! Domain entities and pure logic
//!
//! Everything in this module is free of I/O: device identity and session
//! values, the track/plan model with its diff policies, and the error
//! taxonomy shared by the engine and the adapters.

pub mod device;
pub mod errors;
pub mod plan;

pub use device::{ConnectionKind, Device, DeviceId, DeviceSession, DeviceState};
pub use errors::SyncError;
pub use plan::{compute_plan, is_audio_file, DiffPolicy, LocalTrack, RemoteTrack, SyncPlan};
