//! Port definitions (trait interfaces for adapters)
//!
//! The rest of the core never parses raw tool output; everything fragile
//! lives behind these two traits, one per external tool.

pub mod bridge;
pub mod scanner;

pub use bridge::{BridgeClient, DeviceEntry, PushOutcome};
pub use scanner::DeviceScanner;
