//! The namespaced data store.
//!
//! Arbitrary structured payloads from the protocol land here under known
//! top-level namespaces: the catalog (name/id mapping tables, published as
//! `data_package`), the slot settings blob (`slot_data`), and retrieved
//! key/value results. Unknown namespaces go into an extension bucket so
//! forward-compatible payloads survive a round trip. Merging is shallow:
//! per-key last-write-wins at the top level only, no deep recursive merge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Namespaced store for catalog, slot-settings, and retrieved payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStore {
    /// The catalog (data package): name-to-id mapping tables per game.
    /// Whole-value replaced on every catalog-changed event.
    #[serde(rename = "data_package", skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Value>,

    /// The raw slot settings payload from the slot-established event.
    /// Whole-value replaced when present.
    #[serde(rename = "slot_data", skip_serializing_if = "Option::is_none")]
    pub slot_settings: Option<Value>,

    /// Key/value results retrieved from the upstream storage service.
    /// Per-key last-write-wins.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub retrieved: BTreeMap<String, Value>,

    /// Forward-compatibility bucket for namespaces this schema does not
    /// know. Serialized inline at the top level.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl DataStore {
    /// Replace the catalog namespace wholesale.
    pub fn replace_catalog(&mut self, catalog: Value) {
        self.catalog = Some(catalog);
    }

    /// Replace the slot settings namespace wholesale.
    pub fn set_slot_settings(&mut self, settings: Value) {
        self.slot_settings = Some(settings);
    }

    /// Merge retrieved key/value entries, last write winning per key.
    pub fn merge_retrieved(&mut self, entries: BTreeMap<String, Value>) {
        self.retrieved.extend(entries);
    }

    /// Store a payload under an unknown top-level namespace.
    pub fn insert_extension(&mut self, namespace: String, payload: Value) {
        self.extensions.insert(namespace, payload);
    }

    /// Count the catalog's location entries for the given game.
    ///
    /// Walks `catalog.games[<game>].locations` and returns the number of
    /// entries in that object. Returns 0 when any step is absent or the
    /// shape is not an object; a malformed catalog never fails a flush.
    pub fn location_count(&self, game: &str) -> u64 {
        let locations = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.get("games"))
            .and_then(|games| games.get(game))
            .and_then(|entry| entry.get("locations"))
            .and_then(Value::as_object);

        locations.map_or(0, |map| u64::try_from(map.len()).unwrap_or(u64::MAX))
    }
}
