//! Error types for the bridge binary.
//!
//! [`FetcherError`] covers startup failures only. Once the bridge loop
//! is running, every failure mode is contained at a smaller scope
//! (per event, per flush) and the loop carries on.

/// Top-level startup error for the bridge binary.
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Configuration loading failed (missing file, invalid YAML, or the
    /// required `connection` section absent).
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: waystone_core::config::ConfigError,
    },
}
