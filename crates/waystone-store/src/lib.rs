//! Snapshot persistence layer for the Waystone bridge.
//!
//! The durable output of the whole system is a single JSON document,
//! overwritten wholesale on every flush. The external reader is a
//! separate process that tolerates a document mid-write (it retries on
//! parse failure), so publication deliberately does not use a
//! rename-swap.
//!
//! # Modules
//!
//! - [`snapshot_writer`] -- Serializes and publishes snapshot documents,
//!   tracking the writer phase through each flush.
//! - [`error`] -- Shared error types.

pub mod error;
pub mod snapshot_writer;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use snapshot_writer::{SnapshotWriter, WriterPhase};
