//! Item payloads and timestamped item records.
//!
//! [`NetworkItem`] is the wire-shaped payload carried by an items-received
//! event. [`ItemRecord`] is the stored form: the same fields plus the
//! local receive time stamped at merge time (not protocol time).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item grant as delivered by the protocol, without a local timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    /// Ordering index assigned by the upstream service. Duplicate indices
    /// across batches are possible (resync replays) and preserved.
    pub index: i64,
    /// Item identifier.
    pub item: i64,
    /// Location identifier the item came from.
    pub location: i64,
    /// Source player number.
    pub player: i64,
    /// Classification flag bitmask.
    pub flags: u32,
}

/// One entry of the append-only received-item log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Ordering index assigned by the upstream service.
    pub index: i64,
    /// Item identifier.
    pub item: i64,
    /// Location identifier the item came from.
    pub location: i64,
    /// Source player number.
    pub player: i64,
    /// Classification flag bitmask.
    pub flags: u32,
    /// Local wall-clock time the item was merged into state.
    #[serde(rename = "time")]
    pub received_at: DateTime<Utc>,
}

impl ItemRecord {
    /// Build a record from a wire payload, stamping the given receive time.
    pub const fn from_network(item: &NetworkItem, received_at: DateTime<Utc>) -> Self {
        Self {
            index: item.index,
            item: item.item,
            location: item.location,
            player: item.player,
            flags: item.flags,
            received_at,
        }
    }
}
