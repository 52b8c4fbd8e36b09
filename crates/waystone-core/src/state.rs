//! The mutex-owned canonical state store.
//!
//! [`StateStore`] is the single owner of the session state for the
//! lifetime of the process. Exactly one critical section protects all
//! mutation and all snapshot reads, so every exposed read reflects a
//! whole number of completed merges: no observer ever sees a partially
//! applied event. The bridge runs single-threaded today, but the store
//! enforces exclusion as an explicit contract so a richer deployment
//! (a dedicated flush timer, handlers on multiple transport callbacks)
//! stays correct without redesign.
//!
//! Merge rules per event kind:
//!
//! - locations checked: set union into the checked-location set
//! - items received: append in given order, stamping the local receive
//!   time at merge time (not protocol time), no deduplication by index
//! - catalog / retrieved payloads: whole-value replace, or per-key
//!   last-write-wins, at the relevant namespace
//! - session / slot scalars: per-field assignment, never whole-struct
//!   replace, so a partial update cannot erase previously-held fields

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use waystone_types::{ItemRecord, NetworkItem, RoomUpdate, SessionState, SlotUpdate};

/// Lock-owned canonical session state.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: Mutex<SessionState>,
}

impl StateStore {
    /// Create a store with zero/empty defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial room update, field by field.
    pub async fn apply_room(&self, update: &RoomUpdate) {
        let mut state = self.inner.lock().await;
        state.session.apply(update);
    }

    /// Merge a partial slot update, field by field.
    ///
    /// When the update carries a raw settings payload it is stored into
    /// the data store's slot-settings namespace in the same critical
    /// section, so the identity and its settings land atomically.
    pub async fn apply_slot(&self, update: &SlotUpdate) {
        let mut state = self.inner.lock().await;
        state.slot.apply(update);
        if let Some(settings) = &update.settings {
            state.data.set_slot_settings(settings.clone());
        }
    }

    /// Union the given location ids into the checked set.
    ///
    /// Returns the number of ids that were not already present. The set
    /// never shrinks; re-checking a location is idempotent.
    pub async fn merge_checked_locations(&self, locations: &[i64]) -> usize {
        let mut state = self.inner.lock().await;
        locations
            .iter()
            .filter(|id| state.checked_locations.insert(**id))
            .count()
    }

    /// Append items to the received-item log in the order given.
    ///
    /// Every record is stamped with `received_at`. Duplicate indices are
    /// preserved verbatim; resync replays lengthen the log. Returns the
    /// log length after the append.
    pub async fn append_items(&self, items: &[NetworkItem], received_at: DateTime<Utc>) -> usize {
        let mut state = self.inner.lock().await;
        state
            .items
            .extend(items.iter().map(|item| ItemRecord::from_network(item, received_at)));
        state.items.len()
    }

    /// Replace the catalog namespace wholesale.
    pub async fn replace_catalog(&self, catalog: Value) {
        let mut state = self.inner.lock().await;
        state.data.replace_catalog(catalog);
    }

    /// Merge retrieved key/value entries, last write winning per key.
    pub async fn merge_retrieved(&self, entries: BTreeMap<String, Value>) {
        let mut state = self.inner.lock().await;
        state.data.merge_retrieved(entries);
    }

    /// Take a consistent point-in-time copy of the full state.
    ///
    /// The critical section covers only the clone; callers serialize and
    /// perform I/O outside it so slow storage never blocks event
    /// handling for longer than the copy step.
    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn item(index: i64) -> NetworkItem {
        NetworkItem {
            index,
            item: 10,
            location: 5,
            player: 1,
            flags: 0,
        }
    }

    #[tokio::test]
    async fn checked_locations_accumulate_as_a_set_union() {
        let store = StateStore::new();

        let added = store.merge_checked_locations(&[1, 2, 3]).await;
        assert_eq!(added, 3);

        let added = store.merge_checked_locations(&[3, 4]).await;
        assert_eq!(added, 1);

        let state = store.snapshot().await;
        let checked: Vec<i64> = state.checked_locations.iter().copied().collect();
        assert_eq!(checked, vec![1, 2, 3, 4]);
        // Union size never exceeds the sum of batch sizes.
        assert!(state.checked_locations.len() <= 5);
    }

    #[tokio::test]
    async fn item_log_preserves_arrival_order_and_duplicates() {
        let store = StateStore::new();
        let now = Utc::now();

        store.append_items(&[item(0)], now).await;
        // The same index arriving again (resync replay) is kept verbatim.
        let total = store.append_items(&[item(0)], now).await;
        assert_eq!(total, 2);

        store.append_items(&[item(1), item(2)], now).await;

        let state = store.snapshot().await;
        let indices: Vec<i64> = state.items.iter().map(|record| record.index).collect();
        assert_eq!(indices, vec![0, 0, 1, 2]);
    }

    #[tokio::test]
    async fn item_log_length_equals_total_across_batches() {
        let store = StateStore::new();
        let now = Utc::now();

        let batches: Vec<Vec<NetworkItem>> =
            vec![vec![item(0), item(1)], vec![], vec![item(2)], vec![item(1)]];
        let expected: usize = batches.iter().map(Vec::len).sum();

        for batch in &batches {
            store.append_items(batch, now).await;
        }

        assert_eq!(store.snapshot().await.items.len(), expected);
    }

    #[tokio::test]
    async fn partial_room_update_keeps_prior_fields() {
        let store = StateStore::new();
        store
            .apply_room(&RoomUpdate {
                seed: Some(String::from("abc123")),
                hint_points: Some(5),
                ..RoomUpdate::default()
            })
            .await;
        store
            .apply_room(&RoomUpdate {
                hint_points: Some(7),
                ..RoomUpdate::default()
            })
            .await;

        let state = store.snapshot().await;
        assert_eq!(state.session.seed, "abc123");
        assert_eq!(state.session.hint_points, 7);
    }

    #[tokio::test]
    async fn slot_update_lands_identity_and_settings_together() {
        let store = StateStore::new();
        store
            .apply_slot(&SlotUpdate {
                slot_name: Some(String::from("Jade")),
                game: Some(String::from("Hollow Knight")),
                settings: Some(json!({ "grub_count": 46 })),
                ..SlotUpdate::default()
            })
            .await;

        let state = store.snapshot().await;
        assert_eq!(state.slot.slot_name, "Jade");
        assert_eq!(state.data.slot_settings, Some(json!({ "grub_count": 46 })));
    }

    #[tokio::test]
    async fn snapshot_never_sees_a_partial_merge() {
        let store = Arc::new(StateStore::new());
        let batch: Vec<i64> = (0..512).collect();
        let batch_len = batch.len();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.merge_checked_locations(&batch).await;
            })
        };

        // Concurrent snapshots observe the batch all-or-nothing.
        for _ in 0..64 {
            let seen = store.snapshot().await.checked_locations.len();
            assert!(seen == 0 || seen == batch_len, "partial merge visible: {seen}");
        }

        writer.await.unwrap();
        assert_eq!(store.snapshot().await.checked_locations.len(), batch_len);
    }
}
