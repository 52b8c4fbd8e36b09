//! State aggregation, event routing, and the bridge loop for Waystone.
//!
//! This crate owns the core of the bridge: events drained from the
//! protocol event source are routed through one handling routine per
//! kind, merged into the lock-owned state store, and periodically
//! projected into a snapshot document for publication.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `waystone-config.yaml` into
//!   strongly-typed structs.
//! - [`decode`] -- Defensive decoding of feed payloads into typed events.
//! - [`router`] -- The event handler layer: one routine per event kind,
//!   each deciding whether the event warrants an immediate flush.
//! - [`runner`] -- The driver loop pumping the source and triggering
//!   flushes on cadence, plus the [`SnapshotSink`] publication seam.
//! - [`source`] -- The [`EventSource`] subscription contract, the channel
//!   endpoint a transport drives, and a scripted test double.
//! - [`state`] -- The mutex-owned canonical state store.
//!
//! [`EventSource`]: source::EventSource
//! [`SnapshotSink`]: runner::SnapshotSink

pub mod config;
pub mod decode;
pub mod router;
pub mod runner;
pub mod source;
pub mod state;
