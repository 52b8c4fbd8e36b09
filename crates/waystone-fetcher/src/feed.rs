//! Event feed intake.
//!
//! The external protocol client delivers its callbacks as one JSON
//! object per line. A dedicated thread reads the feed, decodes each line
//! defensively, and pushes the resulting events through the
//! [`EventSender`] into the bridge. A malformed line is logged and
//! discarded on its own; the feed keeps flowing. When the feed reaches
//! end-of-file the thread ends and the bridge keeps flushing on cadence
//! with whatever state it holds.

use std::io::BufRead;

use tracing::{info, warn};
use waystone_core::decode;
use waystone_core::source::EventSender;

/// Spawn the feed thread reading NDJSON events from stdin.
///
/// Reading stdin blocks, so the intake runs on its own OS thread rather
/// than a runtime task; the channel hands events to the async loop.
pub fn spawn_stdin_feed(events: EventSender) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        pump_lines(stdin.lock(), &events);
    })
}

/// Drain a line-oriented reader into the bridge until EOF or read error.
fn pump_lines<R: BufRead>(reader: R, events: &EventSender) {
    for line in reader.lines() {
        let text = match line {
            Ok(text) => text,
            Err(error) => {
                warn!(error = %error, "event feed read failed");
                break;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let payload = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, "discarding unparseable feed line");
                continue;
            }
        };

        match decode::decode_event(&payload) {
            Ok(event) => {
                if !events.send(event) {
                    info!("bridge side closed, stopping event feed");
                    return;
                }
            }
            Err(error) => {
                warn!(error = %error, "discarding undecodable feed line");
            }
        }
    }

    info!("event feed closed");
}
