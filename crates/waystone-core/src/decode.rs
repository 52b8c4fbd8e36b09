//! Defensive decoding of feed payloads into typed events.
//!
//! The transport adapter delivers one JSON object per protocol callback,
//! tagged by an `event` field whose value matches
//! [`SessionEvent::kind`]. Decoding is deliberately tolerant: absent
//! optional fields become `None` (the merge falls back to previously-held
//! values), and a field with an unexpected shape is skipped on its own
//! rather than failing the whole event. Only a payload that is not an
//! object, carries no kind, or carries an unknown kind is rejected.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use waystone_types::{NetworkItem, RoomUpdate, SessionEvent, SlotUpdate};

/// Errors that reject a feed payload outright.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not a JSON object.
    #[error("event payload is not an object")]
    NotAnObject,

    /// The payload has no `event` kind tag.
    #[error("event payload has no kind tag")]
    MissingKind,

    /// The kind tag names no known event.
    #[error("unknown event kind: {kind}")]
    UnknownKind {
        /// The unrecognized kind tag.
        kind: String,
    },
}

/// Decode one feed payload into a typed event.
///
/// # Errors
///
/// Returns [`DecodeError`] only for payloads that cannot be attributed to
/// an event kind at all. Field-level problems never fail the event.
pub fn decode_event(payload: &Value) -> Result<SessionEvent, DecodeError> {
    let object = payload.as_object().ok_or(DecodeError::NotAnObject)?;
    let kind = object
        .get("event")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingKind)?;

    match kind {
        "room_established" => Ok(SessionEvent::RoomEstablished(decode_room_update(object))),
        "slot_established" => Ok(SessionEvent::SlotEstablished(decode_slot_update(object))),
        "slot_disconnected" => Ok(SessionEvent::SlotDisconnected),
        "catalog_changed" => Ok(SessionEvent::CatalogChanged {
            catalog: object.get("catalog").cloned().unwrap_or(Value::Null),
        }),
        "locations_checked" => Ok(SessionEvent::LocationsChecked {
            locations: decode_location_ids(object.get("locations")),
        }),
        "items_received" => Ok(SessionEvent::ItemsReceived {
            items: decode_items(object.get("items")),
        }),
        "values_retrieved" => Ok(SessionEvent::ValuesRetrieved {
            entries: decode_entries(object.get("entries")),
        }),
        "transport_connected" => Ok(SessionEvent::TransportConnected),
        "transport_disconnected" => Ok(SessionEvent::TransportDisconnected),
        "transport_error" => Ok(SessionEvent::TransportError {
            message: opt_string(object, "message").unwrap_or_default(),
        }),
        "message" => Ok(SessionEvent::Message {
            text: opt_string(object, "text").unwrap_or_default(),
        }),
        other => Err(DecodeError::UnknownKind {
            kind: other.to_owned(),
        }),
    }
}

fn decode_room_update(object: &Map<String, Value>) -> RoomUpdate {
    RoomUpdate {
        room_name: opt_string(object, "room_name"),
        seed: opt_string(object, "seed"),
        server_version: opt_string(object, "server_version"),
        generator_version: opt_string(object, "generator_version"),
        hint_points: opt_i64(object, "hint_points"),
        hint_cost_percent: opt_i64(object, "hint_cost_percent"),
        hint_cost_points: opt_i64(object, "hint_cost_points"),
    }
}

fn decode_slot_update(object: &Map<String, Value>) -> SlotUpdate {
    SlotUpdate {
        slot_name: opt_string(object, "slot_name"),
        game: opt_string(object, "game"),
        slot_id: opt_i64(object, "slot_id"),
        team_id: opt_i64(object, "team_id"),
        player_number: opt_i64(object, "player_number"),
        team_number: opt_i64(object, "team_number"),
        settings: object.get("settings").cloned(),
    }
}

/// Extract a list of location ids, skipping entries that are not integers.
fn decode_location_ids(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// Extract item payloads, skipping entries that are not objects.
///
/// Missing numeric fields take the protocol's zero values, except the
/// ordering index whose not-known sentinel is -1.
fn decode_items(value: Option<&Value>) -> Vec<NetworkItem> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .map(|entry| NetworkItem {
                    index: opt_i64(entry, "index").unwrap_or(-1),
                    item: opt_i64(entry, "item").unwrap_or(0),
                    location: opt_i64(entry, "location").unwrap_or(0),
                    player: opt_i64(entry, "player").unwrap_or(0),
                    flags: opt_u32(entry, "flags").unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Extract retrieved key/value entries; a non-object payload yields none.
fn decode_entries(value: Option<&Value>) -> BTreeMap<String, Value> {
    value
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .map(|(key, val)| (key.clone(), val.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn opt_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn opt_i64(object: &Map<String, Value>, key: &str) -> Option<i64> {
    object.get(key).and_then(Value::as_i64)
}

fn opt_u32(object: &Map<String, Value>, key: &str) -> Option<u32> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|raw| u32::try_from(raw).ok())
}
