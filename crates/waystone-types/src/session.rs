//! Session and slot identity, and the aggregate session state.
//!
//! [`SessionInfo`] and [`SlotInfo`] are populated from low-frequency
//! protocol milestones (room established, slot established) and updated
//! per-field: a later partial update never erases fields the payload did
//! not carry. [`SessionState`] is the full canonical state the state store
//! owns for the lifetime of the process.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::datastore::DataStore;
use crate::events::{RoomUpdate, SlotUpdate};
use crate::items::ItemRecord;

/// Sentinel for numeric slot identity fields that are not yet known.
const UNKNOWN_ID: i64 = -1;

/// Room-level session metadata (seed, versions, hint economy).
///
/// Set when the session-established event fires; fields may be updated
/// again if the event recurs (e.g. reconnect), but are otherwise immutable
/// between events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Human-readable room name. The upstream service may never supply
    /// this; readers tolerate an empty string.
    pub room_name: String,
    /// Seed identifier for the generated multiworld.
    pub seed: String,
    /// Server protocol version string.
    pub server_version: String,
    /// Generator version string.
    pub generator_version: String,
    /// Current hint-point balance for the slot.
    pub hint_points: i64,
    /// Hint cost as a percentage of total locations.
    pub hint_cost_percent: i64,
    /// Hint cost in points. Never derived locally; 0 until supplied.
    pub hint_cost_points: i64,
}

impl SessionInfo {
    /// Apply a partial room update, assigning only the fields present.
    pub fn apply(&mut self, update: &RoomUpdate) {
        if let Some(room_name) = &update.room_name {
            self.room_name.clone_from(room_name);
        }
        if let Some(seed) = &update.seed {
            self.seed.clone_from(seed);
        }
        if let Some(server_version) = &update.server_version {
            self.server_version.clone_from(server_version);
        }
        if let Some(generator_version) = &update.generator_version {
            self.generator_version.clone_from(generator_version);
        }
        if let Some(hint_points) = update.hint_points {
            self.hint_points = hint_points;
        }
        if let Some(hint_cost_percent) = update.hint_cost_percent {
            self.hint_cost_percent = hint_cost_percent;
        }
        if let Some(hint_cost_points) = update.hint_cost_points {
            self.hint_cost_points = hint_cost_points;
        }
    }
}

/// Identity of this client's slot within the session.
///
/// Numeric fields hold `-1` until the slot-established event supplies
/// them. Same per-field update discipline as [`SessionInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Display name of the slot/player.
    pub slot_name: String,
    /// Game identifier the slot is playing.
    pub game: String,
    /// Numeric slot id (-1 until known).
    pub slot_id: i64,
    /// Numeric team id (-1 until known).
    pub team_id: i64,
    /// Player number within the session (-1 until known).
    pub player_number: i64,
    /// Team number within the session (-1 until known).
    pub team_number: i64,
}

impl Default for SlotInfo {
    fn default() -> Self {
        Self {
            slot_name: String::new(),
            game: String::new(),
            slot_id: UNKNOWN_ID,
            team_id: UNKNOWN_ID,
            player_number: UNKNOWN_ID,
            team_number: UNKNOWN_ID,
        }
    }
}

impl SlotInfo {
    /// Apply a partial slot update, assigning only the fields present.
    ///
    /// The raw settings payload, when carried, is merged by the state
    /// store into the data store; it is not part of the slot identity.
    pub fn apply(&mut self, update: &SlotUpdate) {
        if let Some(slot_name) = &update.slot_name {
            self.slot_name.clone_from(slot_name);
        }
        if let Some(game) = &update.game {
            self.game.clone_from(game);
        }
        if let Some(slot_id) = update.slot_id {
            self.slot_id = slot_id;
        }
        if let Some(team_id) = update.team_id {
            self.team_id = team_id;
        }
        if let Some(player_number) = update.player_number {
            self.player_number = player_number;
        }
        if let Some(team_number) = update.team_number {
            self.team_number = team_number;
        }
    }
}

/// The full canonical state aggregated from protocol events.
///
/// Created with zero/empty defaults at process start and progressively
/// populated as protocol milestones occur. The state store is the only
/// mutator; snapshots are whole-value clones taken inside its critical
/// section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Room-level session metadata.
    pub session: SessionInfo,
    /// This client's slot identity.
    pub slot: SlotInfo,
    /// Monotonically non-shrinking set of checked location ids.
    pub checked_locations: BTreeSet<i64>,
    /// Append-only log of received items, in arrival order.
    pub items: Vec<ItemRecord>,
    /// Namespaced catalog / slot-settings / retrieved blob.
    pub data: DataStore,
}
