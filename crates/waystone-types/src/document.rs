//! The snapshot document schema.
//!
//! A [`SnapshotDocument`] is the self-consistent projection of session
//! state that gets published for the external reader, plus a pass-through
//! echo of the static connection configuration so the reader does not need
//! a second configuration source. Building the document is pure: all
//! sections are copied out of a [`SessionState`] value the caller already
//! cloned inside the state store's critical section.

use serde::{Deserialize, Serialize};

use crate::datastore::DataStore;
use crate::items::ItemRecord;
use crate::session::SessionState;

/// The `room` section: session metadata plus the derived location count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSection {
    /// Room name (may be empty; see [`crate::session::SessionInfo`]).
    pub room_name: String,
    /// Seed identifier.
    pub seed: String,
    /// Server protocol version string.
    pub server_version: String,
    /// Generator version string.
    pub generator_version: String,
    /// Hint-point balance.
    pub hint_points: i64,
    /// Hint cost in percent.
    pub hint_cost_percent: i64,
    /// Hint cost in points.
    pub hint_cost_points: i64,
    /// Number of catalog locations for the active game; 0 when the
    /// catalog is absent or malformed.
    pub location_count: u64,
}

/// The `me` section: this client's slot identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSection {
    /// Slot/player display name.
    pub slot_name: String,
    /// Game identifier.
    pub game: String,
    /// Numeric slot id (-1 until known).
    pub slot_id: i64,
    /// Numeric team id (-1 until known).
    pub team_id: i64,
    /// Player number (-1 until known).
    pub player_number: i64,
    /// Team number (-1 until known).
    pub team_number: i64,
}

/// Static connection parameters echoed into every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEcho {
    /// Upstream service host.
    pub host: String,
    /// Upstream service port.
    pub port: u16,
    /// Game the slot plays.
    pub game: String,
    /// Slot name used for the session handshake.
    pub slot_name: String,
    /// Session password (may be empty).
    pub password: String,
    /// Item-handling mode flags requested at handshake.
    pub items_handling: u32,
    /// Capability tags requested at handshake.
    pub tags: Vec<String>,
}

/// The complete snapshot document published to durable storage.
///
/// Overwritten wholesale on every flush. An external reader may observe a
/// document mid-write; readers retry on parse failure by contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Session metadata and derived location count.
    pub room: RoomSection,
    /// Slot identity.
    pub me: SlotSection,
    /// Checked location ids in ascending order.
    pub checked_locations: Vec<i64>,
    /// Received items in arrival order.
    pub items: Vec<ItemRecord>,
    /// Namespaced catalog / slot-settings / retrieved blob.
    pub data_storage: DataStore,
    /// Pass-through connection configuration echo.
    pub connection: ConnectionEcho,
}

impl SnapshotDocument {
    /// Project a session state into a publishable document.
    ///
    /// The location count is derived from the data store's catalog for the
    /// active game, defensively (0 on absence or malformed shape). The
    /// checked-location set iterates in ascending numeric order, which
    /// keeps serialization deterministic.
    pub fn build(state: &SessionState, connection: ConnectionEcho) -> Self {
        let location_count = state.data.location_count(&state.slot.game);

        Self {
            room: RoomSection {
                room_name: state.session.room_name.clone(),
                seed: state.session.seed.clone(),
                server_version: state.session.server_version.clone(),
                generator_version: state.session.generator_version.clone(),
                hint_points: state.session.hint_points,
                hint_cost_percent: state.session.hint_cost_percent,
                hint_cost_points: state.session.hint_cost_points,
                location_count,
            },
            me: SlotSection {
                slot_name: state.slot.slot_name.clone(),
                game: state.slot.game.clone(),
                slot_id: state.slot.slot_id,
                team_id: state.slot.team_id,
                player_number: state.slot.player_number,
                team_number: state.slot.team_number,
            },
            checked_locations: state.checked_locations.iter().copied().collect(),
            items: state.items.clone(),
            data_storage: state.data.clone(),
            connection,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::events::RoomUpdate;

    #[test]
    fn build_projects_room_scenario() {
        let mut state = SessionState::default();
        state.session.apply(&RoomUpdate {
            seed: Some(String::from("abc123")),
            hint_points: Some(5),
            ..RoomUpdate::default()
        });

        let document = SnapshotDocument::build(&state, ConnectionEcho::default());
        assert_eq!(document.room.seed, "abc123");
        assert_eq!(document.room.hint_points, 5);
        assert_eq!(document.room.location_count, 0);
    }

    #[test]
    fn build_derives_location_count_for_active_game() {
        let mut state = SessionState::default();
        state.slot.game = String::from("Hollow Knight");
        state.data.replace_catalog(json!({
            "games": {
                "Hollow Knight": { "locations": { "a": 1, "b": 2 } },
                "Other Game": { "locations": { "x": 9 } }
            }
        }));

        let document = SnapshotDocument::build(&state, ConnectionEcho::default());
        assert_eq!(document.room.location_count, 2);
    }

    #[test]
    fn checked_locations_serialize_in_ascending_order() {
        let mut state = SessionState::default();
        for id in [40, 2, 17, 2] {
            state.checked_locations.insert(id);
        }

        let document = SnapshotDocument::build(&state, ConnectionEcho::default());
        assert_eq!(document.checked_locations, vec![2, 17, 40]);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut state = SessionState::default();
        state.session.seed = String::from("s33d");
        state.checked_locations.insert(12);

        let echo = ConnectionEcho {
            host: String::from("localhost"),
            port: 38281,
            game: String::from("Hollow Knight"),
            slot_name: String::from("Jade"),
            password: String::new(),
            items_handling: 7,
            tags: vec![String::from("Tracker")],
        };

        let document = SnapshotDocument::build(&state, echo);
        let text = serde_json::to_string_pretty(&document).unwrap();
        let back: SnapshotDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back, document);
    }
}
