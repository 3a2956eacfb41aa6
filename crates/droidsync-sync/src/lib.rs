//! droidsync engine
//!
//! Ties the domain core to the adapter ports:
//! - [`connection`] - session establishment and verification
//! - [`diff`] - local enumeration and plan computation
//! - [`engine`] - the cancellable transfer orchestrator
//! - [`runner`] - single-flight task discipline and cancellation

pub mod connection;
pub mod diff;
pub mod engine;
pub mod runner;

pub use connection::{ConnectionManager, ConnectionReport};
pub use diff::DiffDriver;
pub use engine::{ProgressEvent, SyncOutcome, TransferOrchestrator, TransferReport};
pub use runner::{TaskPermit, TaskRunner, TaskState};
