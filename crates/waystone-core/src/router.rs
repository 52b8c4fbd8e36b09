//! The event handler layer: one routine per event kind.
//!
//! [`EventRouter::route`] dispatches each drained event to its handling
//! routine. Every routine applies its merge to the state store, emits one
//! structured log line summarizing the event, and reports how urgently
//! the new state should be persisted. Handlers never perform file I/O
//! themselves; the driver loop owns flushing.
//!
//! Low-frequency, high-value events (room established, slot established,
//! catalog changed, values retrieved) demand an immediate out-of-band
//! flush. High-frequency events (locations checked, items received)
//! defer to the periodic cadence to bound write amplification.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use waystone_types::SessionEvent;

use crate::state::StateStore;

/// How urgently the state behind an event should be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushUrgency {
    /// Flush before the next loop iteration.
    Immediate,
    /// Let the periodic cadence pick the change up.
    Deferred,
    /// Nothing to persist; the event was observe-only.
    None,
}

/// Routes protocol events into the state store.
#[derive(Debug)]
pub struct EventRouter {
    store: Arc<StateStore>,
}

impl EventRouter {
    /// Create a router that merges into the given store.
    pub const fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    /// Dispatch one event to its handling routine.
    ///
    /// Infallible by design: field-level problems were already absorbed
    /// at the decode boundary, and every merge below is total. A single
    /// bad event can therefore never take the loop down.
    pub async fn route(&self, event: &SessionEvent) -> FlushUrgency {
        match event {
            SessionEvent::RoomEstablished(update) => {
                self.store.apply_room(update).await;
                info!(
                    seed = update.seed.as_deref().unwrap_or(""),
                    hint_points = update.hint_points,
                    hint_cost_percent = update.hint_cost_percent,
                    "room established"
                );
                FlushUrgency::Immediate
            }
            SessionEvent::SlotEstablished(update) => {
                self.store.apply_slot(update).await;
                info!(
                    slot_name = update.slot_name.as_deref().unwrap_or(""),
                    game = update.game.as_deref().unwrap_or(""),
                    slot_id = update.slot_id,
                    team_id = update.team_id,
                    "slot established"
                );
                FlushUrgency::Immediate
            }
            SessionEvent::SlotDisconnected => {
                warn!("slot disconnected");
                FlushUrgency::None
            }
            SessionEvent::CatalogChanged { catalog } => {
                self.store.replace_catalog(catalog.clone()).await;
                info!("catalog replaced");
                FlushUrgency::Immediate
            }
            SessionEvent::LocationsChecked { locations } => {
                let newly_checked = self.store.merge_checked_locations(locations).await;
                info!(
                    batch = locations.len(),
                    newly_checked, "locations checked"
                );
                FlushUrgency::Deferred
            }
            SessionEvent::ItemsReceived { items } => {
                let total = self.store.append_items(items, Utc::now()).await;
                info!(batch = items.len(), total, "items received");
                FlushUrgency::Deferred
            }
            SessionEvent::ValuesRetrieved { entries } => {
                let keys = entries.len();
                self.store.merge_retrieved(entries.clone()).await;
                info!(keys, "values retrieved");
                FlushUrgency::Immediate
            }
            SessionEvent::TransportConnected => {
                info!("transport connected");
                FlushUrgency::None
            }
            SessionEvent::TransportDisconnected => {
                warn!("transport disconnected");
                FlushUrgency::None
            }
            SessionEvent::TransportError { message } => {
                warn!(message = message.as_str(), "transport error");
                FlushUrgency::None
            }
            SessionEvent::Message { text } => {
                debug!(text = text.as_str(), "session message");
                FlushUrgency::None
            }
        }
    }
}
