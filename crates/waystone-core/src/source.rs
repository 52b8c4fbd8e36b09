//! Event source contract and implementations.
//!
//! The driver loop pumps an [`EventSource`] once per iteration to drain
//! all currently-available events, in delivery order. The trait abstracts
//! the mechanism by which events arrive: in production a transport
//! adapter pushes decoded events through an [`EventSender`] into a
//! [`ChannelEventSource`]; tests replay a scripted batch sequence.
//!
//! The source is not assumed to guarantee no duplicates or gaps; the
//! state-store merge semantics absorb both.

use std::collections::VecDeque;

use tokio::sync::mpsc;
use waystone_types::SessionEvent;

/// Errors that can occur while draining the event source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The event feed closed and no further events will arrive.
    #[error("event source closed")]
    Closed,

    /// An internal error in the event source.
    #[error("event source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// A source of protocol events.
///
/// Implementations yield every event currently available, preserving
/// delivery order. A drain that yields no events is normal (the session
/// is quiet); the loop keeps flushing on cadence regardless.
pub trait EventSource {
    /// Drain all currently-available events without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source can no longer deliver.
    /// The driver loop logs and continues; source failure is not a loop
    /// exit condition.
    fn poll(&mut self) -> Result<Vec<SessionEvent>, SourceError>;
}

/// Sending half of the channel event source.
///
/// The transport adapter holds this handle and pushes one decoded event
/// per protocol callback. Cloneable so multiple transport callbacks can
/// feed the same bridge.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    /// Push an event into the bridge.
    ///
    /// Returns `false` when the bridge side is gone; the transport may
    /// stop delivering at that point.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Channel-backed event source: the subscription endpoint the bridge
/// drains and a transport feeds.
#[derive(Debug)]
pub struct ChannelEventSource {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    closed_reported: bool,
}

/// Create a connected sender/source pair.
pub fn channel() -> (EventSender, ChannelEventSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventSender { tx },
        ChannelEventSource {
            rx,
            closed_reported: false,
        },
    )
}

impl EventSource for ChannelEventSource {
    fn poll(&mut self) -> Result<Vec<SessionEvent>, SourceError> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(mpsc::error::TryRecvError::Empty) => return Ok(events),
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Deliver what was drained first; report the closure
                    // exactly once on a later empty poll.
                    if !events.is_empty() {
                        return Ok(events);
                    }
                    if self.closed_reported {
                        return Ok(events);
                    }
                    self.closed_reported = true;
                    return Err(SourceError::Closed);
                }
            }
        }
    }
}

/// A scripted event source for tests: each poll yields the next batch.
#[derive(Debug, Default)]
pub struct ScriptedEventSource {
    batches: VecDeque<Vec<SessionEvent>>,
}

impl ScriptedEventSource {
    /// Build a source that replays the given batches, one per poll.
    pub fn new(batches: Vec<Vec<SessionEvent>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Whether every scripted batch has been drained.
    pub fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

impl EventSource for ScriptedEventSource {
    fn poll(&mut self) -> Result<Vec<SessionEvent>, SourceError> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
