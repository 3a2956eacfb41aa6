//! Integration tests for droidsync-sync
//!
//! Uses an in-memory mock bridge to verify end-to-end behavior of the
//! connection manager and the transfer orchestrator: plan computation,
//! idempotence, cancellation, confirmation gating and fast failure when no
//! device is connected.

mod common;

mod test_connection;
mod test_engine;
