//! Inbound protocol event kinds and their partial-update payloads.
//!
//! The protocol event source delivers discrete, ordered events; one
//! [`SessionEvent`] variant exists per kind the bridge subscribes to. The
//! source must not be assumed to guarantee no duplicates or gaps.
//!
//! Update payloads carry every field as an `Option` so a partial update
//! cannot erase previously-held values: defensive extraction happens at
//! the source boundary, and anything absent or malformed there simply
//! arrives as `None`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::items::NetworkItem;

/// Partial update to the room-level session metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    /// Room name, when supplied.
    pub room_name: Option<String>,
    /// Seed identifier, when supplied.
    pub seed: Option<String>,
    /// Server protocol version string, when supplied.
    pub server_version: Option<String>,
    /// Generator version string, when supplied.
    pub generator_version: Option<String>,
    /// Hint-point balance, when supplied.
    pub hint_points: Option<i64>,
    /// Hint cost in percent, when supplied.
    pub hint_cost_percent: Option<i64>,
    /// Hint cost in points, when supplied.
    pub hint_cost_points: Option<i64>,
}

/// Partial update to the slot identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotUpdate {
    /// Slot/player display name, when supplied.
    pub slot_name: Option<String>,
    /// Game identifier, when supplied.
    pub game: Option<String>,
    /// Numeric slot id, when supplied.
    pub slot_id: Option<i64>,
    /// Numeric team id, when supplied.
    pub team_id: Option<i64>,
    /// Player number, when supplied.
    pub player_number: Option<i64>,
    /// Team number, when supplied.
    pub team_number: Option<i64>,
    /// Raw slot settings payload, stored into the data store when present.
    pub settings: Option<Value>,
}

/// One discrete event delivered by the protocol event source.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session/room context is established (or re-established).
    RoomEstablished(RoomUpdate),
    /// The slot identity is established (or re-established).
    SlotEstablished(SlotUpdate),
    /// The slot connection was dropped by the upstream service.
    SlotDisconnected,
    /// The catalog of name/id mapping tables changed.
    CatalogChanged {
        /// The full replacement catalog payload.
        catalog: Value,
    },
    /// One or more locations were checked.
    LocationsChecked {
        /// Location ids, possibly overlapping previously-checked ids.
        locations: Vec<i64>,
    },
    /// One or more items were granted to the slot.
    ItemsReceived {
        /// Item payloads in delivery order.
        items: Vec<NetworkItem>,
    },
    /// Key/value results arrived from the upstream storage service.
    ValuesRetrieved {
        /// Retrieved entries keyed by storage key.
        entries: BTreeMap<String, Value>,
    },
    /// The transport came up.
    TransportConnected,
    /// The transport went down.
    TransportDisconnected,
    /// The transport reported an error.
    TransportError {
        /// Human-readable error description.
        message: String,
    },
    /// A freeform display message from the session.
    Message {
        /// The message text.
        text: String,
    },
}

impl SessionEvent {
    /// Stable kind name used in structured log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RoomEstablished(_) => "room_established",
            Self::SlotEstablished(_) => "slot_established",
            Self::SlotDisconnected => "slot_disconnected",
            Self::CatalogChanged { .. } => "catalog_changed",
            Self::LocationsChecked { .. } => "locations_checked",
            Self::ItemsReceived { .. } => "items_received",
            Self::ValuesRetrieved { .. } => "values_retrieved",
            Self::TransportConnected => "transport_connected",
            Self::TransportDisconnected => "transport_disconnected",
            Self::TransportError { .. } => "transport_error",
            Self::Message { .. } => "message",
        }
    }
}
