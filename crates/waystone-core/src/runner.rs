//! The driver loop and the snapshot publication seam.
//!
//! [`run_bridge`] is the single control loop: each iteration drains the
//! event source, routes every event, triggers an immediate flush when a
//! routed event demands one, flushes on the periodic cadence otherwise,
//! and pauses briefly to bound idle CPU. All mutation happens
//! synchronously within event dispatch; all flushing happens
//! synchronously within the loop body.
//!
//! Failure scoping: a poll error is logged and the iteration continues; a
//! flush error is logged, that cycle's flush is abandoned, and the next
//! scheduled or triggered flush is attempted independently. Nothing that
//! happens in steady state terminates the loop. There is no final flush
//! on stop: state newer than the last completed flush is lost on crash
//! or kill by contract.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use waystone_types::{ConnectionEcho, SnapshotDocument};

use crate::router::{EventRouter, FlushUrgency};
use crate::source::EventSource;
use crate::state::StateStore;

/// Errors surfaced by a snapshot sink.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The document could not be serialized.
    #[error("snapshot serialization failed: {message}")]
    Serialize {
        /// Description of the serialization failure.
        message: String,
    },

    /// Durable storage rejected the write.
    #[error("snapshot storage failed: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
}

/// Destination for snapshot documents.
///
/// Implemented by the persistence layer's writer; tests substitute an
/// in-memory sink. Publication is synchronous by contract: a stalled
/// write delays the next loop iteration but never corrupts state.
pub trait SnapshotSink {
    /// Publish one document, overwriting any prior version.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when serialization or storage fails. The
    /// caller logs and carries on; the sink must be reusable afterwards.
    fn publish(&mut self, document: &SnapshotDocument) -> Result<(), PublishError>;
}

/// Shared control handle for the bridge loop.
///
/// Production wiring never requests a stop (the loop runs until process
/// termination); tests use the handle to bound a run.
#[derive(Debug, Clone, Default)]
pub struct BridgeControl {
    stop_requested: Arc<AtomicBool>,
}

impl BridgeControl {
    /// Create a control handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit before its next iteration.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }
}

/// Pacing options for the bridge loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Interval between periodic snapshot flushes.
    pub flush_interval: Duration,
    /// Pause between loop iterations.
    pub poll_pause: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(2),
            poll_pause: Duration::from_millis(50),
        }
    }
}

/// Counters describing a completed bridge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Events drained and routed.
    pub events_routed: u64,
    /// Flushes triggered by high-value events.
    pub immediate_flushes: u64,
    /// Flushes triggered by the periodic cadence.
    pub periodic_flushes: u64,
    /// Flush attempts that failed (logged and abandoned).
    pub flush_failures: u64,
}

/// Run the bridge loop until a stop is requested.
///
/// Events are handled in the order the source delivers them; a snapshot
/// always reflects every routing completed strictly before its read
/// step. Timing uses the monotonic clock.
pub async fn run_bridge(
    source: &mut dyn EventSource,
    router: &EventRouter,
    store: &StateStore,
    sink: &mut dyn SnapshotSink,
    connection: &ConnectionEcho,
    options: &RunnerOptions,
    control: &BridgeControl,
) -> BridgeSummary {
    let mut summary = BridgeSummary::default();
    let mut last_flush = Instant::now();

    info!(
        flush_interval_secs = options.flush_interval.as_secs(),
        poll_pause_ms = u64::try_from(options.poll_pause.as_millis()).unwrap_or(u64::MAX),
        "bridge loop starting"
    );

    loop {
        if control.is_stop_requested() {
            info!("bridge loop stop requested");
            break;
        }

        // --- Drain and route every available event ---
        let mut immediate_needed = false;
        match source.poll() {
            Ok(events) => {
                for event in &events {
                    let urgency = router.route(event).await;
                    summary.events_routed = summary.events_routed.saturating_add(1);
                    if urgency == FlushUrgency::Immediate {
                        immediate_needed = true;
                    }
                }
            }
            Err(error) => {
                warn!(error = %error, "event source poll failed");
            }
        }

        // --- Out-of-band flush for high-value events ---
        if immediate_needed {
            match flush_snapshot(store, sink, connection).await {
                Ok(()) => {
                    summary.immediate_flushes = summary.immediate_flushes.saturating_add(1);
                    last_flush = Instant::now();
                }
                Err(error) => {
                    summary.flush_failures = summary.flush_failures.saturating_add(1);
                    warn!(error = %error, "immediate flush failed");
                }
            }
        }

        // --- Periodic flush on elapsed wall-clock time ---
        if last_flush.elapsed() >= options.flush_interval {
            match flush_snapshot(store, sink, connection).await {
                Ok(()) => {
                    summary.periodic_flushes = summary.periodic_flushes.saturating_add(1);
                }
                Err(error) => {
                    summary.flush_failures = summary.flush_failures.saturating_add(1);
                    warn!(error = %error, "periodic flush failed");
                }
            }
            // A failed flush never blocks the next scheduled one; the
            // cadence restarts either way.
            last_flush = Instant::now();
        }

        tokio::time::sleep(options.poll_pause).await;
    }

    info!(
        events_routed = summary.events_routed,
        immediate_flushes = summary.immediate_flushes,
        periodic_flushes = summary.periodic_flushes,
        flush_failures = summary.flush_failures,
        "bridge loop ended"
    );

    summary
}

/// Take a consistent snapshot and publish it.
///
/// The state copy happens inside the store's critical section; document
/// assembly, serialization, and I/O all happen after the lock is
/// released, so slow storage never blocks event handling for longer
/// than the copy step.
pub async fn flush_snapshot(
    store: &StateStore,
    sink: &mut dyn SnapshotSink,
    connection: &ConnectionEcho,
) -> Result<(), PublishError> {
    let state = store.snapshot().await;
    let document = SnapshotDocument::build(&state, connection.clone());
    sink.publish(&document)?;
    debug!(
        checked_locations = document.checked_locations.len(),
        items = document.items.len(),
        "snapshot flushed"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use waystone_types::{NetworkItem, RoomUpdate, SessionEvent};

    use super::*;
    use crate::source::{ScriptedEventSource, SourceError};

    /// In-memory sink collecting every published document.
    #[derive(Debug, Default)]
    struct MemorySink {
        published: Vec<SnapshotDocument>,
        fail_next: bool,
    }

    impl SnapshotSink for MemorySink {
        fn publish(&mut self, document: &SnapshotDocument) -> Result<(), PublishError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(PublishError::Storage {
                    message: String::from("disk full"),
                });
            }
            self.published.push(document.clone());
            Ok(())
        }
    }

    /// Wraps a scripted source and requests a stop once it runs dry,
    /// giving tests a deterministic loop exit.
    struct StopWhenDrained {
        inner: ScriptedEventSource,
        control: BridgeControl,
    }

    impl EventSource for StopWhenDrained {
        fn poll(&mut self) -> Result<Vec<SessionEvent>, SourceError> {
            let events = self.inner.poll()?;
            if self.inner.is_exhausted() {
                self.control.request_stop();
            }
            Ok(events)
        }
    }

    fn fast_options() -> RunnerOptions {
        RunnerOptions {
            flush_interval: Duration::ZERO,
            poll_pause: Duration::ZERO,
        }
    }

    fn scripted_run_parts(
        batches: Vec<Vec<SessionEvent>>,
    ) -> (StopWhenDrained, EventRouter, Arc<StateStore>, BridgeControl) {
        let control = BridgeControl::new();
        let source = StopWhenDrained {
            inner: ScriptedEventSource::new(batches),
            control: control.clone(),
        };
        let store = Arc::new(StateStore::new());
        let router = EventRouter::new(Arc::clone(&store));
        (source, router, store, control)
    }

    #[tokio::test]
    async fn routes_all_events_and_flushes() {
        let (mut source, router, store, control) = scripted_run_parts(vec![
            vec![SessionEvent::RoomEstablished(RoomUpdate {
                seed: Some(String::from("abc123")),
                hint_points: Some(5),
                ..RoomUpdate::default()
            })],
            vec![SessionEvent::LocationsChecked {
                locations: vec![1, 2, 3],
            }],
            vec![
                SessionEvent::LocationsChecked {
                    locations: vec![3, 4],
                },
                SessionEvent::ItemsReceived {
                    items: vec![NetworkItem {
                        index: 0,
                        item: 10,
                        location: 5,
                        player: 1,
                        flags: 0,
                    }],
                },
            ],
        ]);

        let mut sink = MemorySink::default();
        let summary = run_bridge(
            &mut source,
            &router,
            &store,
            &mut sink,
            &ConnectionEcho::default(),
            &fast_options(),
            &control,
        )
        .await;

        assert_eq!(summary.events_routed, 4);
        assert_eq!(summary.immediate_flushes, 1);
        assert!(summary.periodic_flushes >= 1);
        assert_eq!(summary.flush_failures, 0);

        let last = sink.published.last().unwrap();
        assert_eq!(last.room.seed, "abc123");
        assert_eq!(last.room.hint_points, 5);
        assert_eq!(last.checked_locations, vec![1, 2, 3, 4]);
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn flush_failure_does_not_end_the_loop() {
        let (mut source, router, store, control) = scripted_run_parts(vec![
            vec![SessionEvent::RoomEstablished(RoomUpdate::default())],
            vec![SessionEvent::LocationsChecked {
                locations: vec![7],
            }],
        ]);

        let mut sink = MemorySink {
            published: Vec::new(),
            fail_next: true,
        };
        let summary = run_bridge(
            &mut source,
            &router,
            &store,
            &mut sink,
            &ConnectionEcho::default(),
            &fast_options(),
            &control,
        )
        .await;

        assert_eq!(summary.flush_failures, 1);
        // A later flush still lands the full state.
        let last = sink.published.last().unwrap();
        assert_eq!(last.checked_locations, vec![7]);
    }

    #[tokio::test]
    async fn deferred_events_wait_for_the_cadence() {
        let (mut source, router, store, control) = scripted_run_parts(vec![vec![
            SessionEvent::LocationsChecked {
                locations: vec![1],
            },
        ]]);

        let mut sink = MemorySink::default();
        let options = RunnerOptions {
            // Cadence far in the future: only the stop path runs.
            flush_interval: Duration::from_secs(3600),
            poll_pause: Duration::ZERO,
        };
        let summary = run_bridge(
            &mut source,
            &router,
            &store,
            &mut sink,
            &ConnectionEcho::default(),
            &options,
            &control,
        )
        .await;

        // No immediate flush for a deferred event, no cadence reached.
        assert_eq!(summary.immediate_flushes, 0);
        assert_eq!(summary.periodic_flushes, 0);
        assert!(sink.published.is_empty());
        // The merge itself still happened.
        assert_eq!(store.snapshot().await.checked_locations.len(), 1);
    }

    #[tokio::test]
    async fn flush_snapshot_publishes_current_state() {
        let store = StateStore::new();
        store.merge_checked_locations(&[5, 1]).await;

        let mut sink = MemorySink::default();
        flush_snapshot(&store, &mut sink, &ConnectionEcho::default())
            .await
            .unwrap();

        let document = sink.published.last().unwrap();
        assert_eq!(document.checked_locations, vec![1, 5]);
    }
}
