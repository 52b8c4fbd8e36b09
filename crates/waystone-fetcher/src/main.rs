//! Waystone bridge binary.
//!
//! Consumes the protocol client's event feed on stdin, aggregates the
//! session state, and publishes a JSON snapshot document on a fixed
//! cadence for the downstream presentation reader.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `waystone-config.yaml` (fatal when missing
//!    or invalid -- the `connection` section is required)
//! 2. Initialize structured logging (tracing), optionally into the
//!    configured log file
//! 3. Wire the event channel and spawn the stdin feed thread
//! 4. Assemble the state store, event router, and snapshot writer
//! 5. Run the bridge loop until process termination

mod error;
mod feed;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use waystone_core::config::BridgeConfig;
use waystone_core::router::EventRouter;
use waystone_core::runner::{self, BridgeControl, RunnerOptions};
use waystone_core::source;
use waystone_core::state::StateStore;
use waystone_store::SnapshotWriter;

use crate::error::FetcherError;

/// Application entry point for the bridge.
///
/// # Errors
///
/// Returns [`FetcherError`] when startup fails; the process exits with a
/// non-zero status before the bridge loop starts. Steady-state failures
/// never propagate here.
#[tokio::main]
async fn main() -> Result<(), FetcherError> {
    // 1. Load configuration.
    let config_path = std::env::var_os("WAYSTONE_CONFIG")
        .map_or_else(|| PathBuf::from("waystone-config.yaml"), PathBuf::from);
    let config = BridgeConfig::from_file(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config);

    info!(
        config = %config_path.display(),
        host = config.connection.host.as_str(),
        port = config.connection.port,
        game = config.connection.game.as_str(),
        slot_name = config.connection.slot_name.as_str(),
        snapshot_file = %config.paths.snapshot_file.display(),
        "waystone-fetcher starting"
    );

    // 3. Wire the event channel and the stdin feed.
    let (events, mut event_source) = source::channel();
    let _feed = feed::spawn_stdin_feed(events);

    // 4. Assemble the core.
    let store = Arc::new(StateStore::new());
    let router = EventRouter::new(Arc::clone(&store));
    let mut writer = SnapshotWriter::new(&config.paths.snapshot_file);
    let connection = config.connection.echo();
    let options = RunnerOptions {
        flush_interval: config.fetcher.flush_interval(),
        poll_pause: config.fetcher.poll_pause(),
    };

    // 5. Run the bridge loop. Production never requests a stop; the
    //    loop runs until the process is terminated, and state newer
    //    than the last completed flush is lost by contract.
    let control = BridgeControl::new();
    let summary = runner::run_bridge(
        &mut event_source,
        &router,
        &store,
        &mut writer,
        &connection,
        &options,
        &control,
    )
    .await;

    info!(
        events_routed = summary.events_routed,
        flush_failures = summary.flush_failures,
        "waystone-fetcher shutdown complete"
    );

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. When a log file is
/// configured it receives the line-oriented, timestamped output in
/// append mode; when it cannot be opened, logging falls back to stdout
/// rather than failing startup. No configured file means stdout only.
fn init_logging(config: &BridgeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let log_file = config.paths.log_file.as_ref().and_then(|path| {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(error) => {
                eprintln!(
                    "waystone-fetcher: cannot open log file {}: {error}, logging to stdout",
                    path.display()
                );
                None
            }
        }
    });

    match log_file {
        Some(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
