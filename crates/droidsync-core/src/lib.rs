//! droidsync core - domain logic and port definitions
//!
//! This crate contains the domain core with:
//! - **Domain entities** - `Device`, `DeviceSession`, `LocalTrack`, `SyncPlan`
//! - **Diff policies** - name-only, name+size and name+hash matching
//! - **Port definitions** - Traits for adapters: `BridgeClient`, `DeviceScanner`
//! - **Settings** - the persisted configuration record
//!
//! # Architecture
//!
//! The domain module contains pure logic with no subprocess or network I/O.
//! Ports define trait interfaces that the adapter crates (`droidsync-bridge`,
//! `droidsync-discovery`) implement; the engine crate (`droidsync-sync`)
//! orchestrates domain entities through the port interfaces.

pub mod domain;
pub mod net;
pub mod ports;
pub mod settings;

/// Well-known directory on the device holding the synced audio files.
pub const DEVICE_MUSIC_DIR: &str = "/sdcard/Music";

/// TCP port the debug bridge listens on when network mode is enabled.
pub const BRIDGE_PORT: u16 = 5555;
