//! Network discovery adapter
//!
//! Finds Android devices with the bridge's network mode enabled by scanning
//! a CIDR range for hosts with the bridge port open, behind the
//! [`DeviceScanner`](droidsync_core::ports::DeviceScanner) trait.

pub mod nmap;

pub use nmap::NmapScanner;
