//! adb adapter for the droidsync bridge port
//!
//! Wraps invocation of the `adb` command-line tool behind the
//! [`BridgeClient`](droidsync_core::ports::BridgeClient) trait so the rest
//! of the system never parses raw tool output.

pub mod adb;

pub use adb::AdbClient;
