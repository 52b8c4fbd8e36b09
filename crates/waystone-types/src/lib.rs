//! Shared type definitions for the Waystone session bridge.
//!
//! This crate is the single source of truth for all types used across the
//! Waystone workspace: the canonical session state, the inbound protocol
//! events, and the snapshot document schema published for the downstream
//! presentation reader.
//!
//! # Modules
//!
//! - [`session`] -- Session and slot identity plus the aggregate
//!   [`SessionState`] owned by the state store.
//! - [`items`] -- Wire-shaped item payloads and timestamped item records.
//! - [`datastore`] -- The namespaced data store (catalog, slot settings,
//!   retrieved values, extension bucket).
//! - [`events`] -- Inbound protocol event kinds and partial updates.
//! - [`document`] -- The snapshot document schema and its projection from
//!   session state.

pub mod datastore;
pub mod document;
pub mod events;
pub mod items;
pub mod session;

// Re-export all public types at crate root for convenience.
pub use datastore::DataStore;
pub use document::{ConnectionEcho, RoomSection, SlotSection, SnapshotDocument};
pub use events::{RoomUpdate, SessionEvent, SlotUpdate};
pub use items::{ItemRecord, NetworkItem};
pub use session::{SessionInfo, SessionState, SlotInfo};
