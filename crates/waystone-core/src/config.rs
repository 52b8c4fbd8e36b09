//! Configuration loading and typed config structures for the bridge.
//!
//! The canonical configuration lives in `waystone-config.yaml` at the
//! deployment root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads the file.
//!
//! The `connection` section is required: without it the bridge has nothing
//! to describe to its downstream reader, so a missing section is a startup
//! failure rather than a runtime one. Every other section defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use waystone_types::ConnectionEcho;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content (including a missing `connection`
    /// section, which the schema requires).
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration.
///
/// Mirrors the structure of `waystone-config.yaml`. The `connection`
/// section is required; all other sections have defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// Upstream connection parameters (required section).
    pub connection: ConnectionConfig,

    /// Storage locations for the snapshot document and the log.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Flush cadence and loop pacing.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for storage paths:
    /// - `WAYSTONE_SNAPSHOT_FILE` overrides `paths.snapshot_file`
    /// - `WAYSTONE_LOG_FILE` overrides `paths.log_file`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML or lacks
    /// the required `connection` section.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.paths.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML or
    /// lacks the required `connection` section.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.paths.apply_env_overrides();
        Ok(config)
    }
}

/// Upstream connection parameters.
///
/// The section must be present in the YAML; individual fields default to
/// the values a local test deployment would use. The whole section is
/// echoed into every snapshot document for the downstream reader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Upstream service host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Upstream service port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Game the slot plays.
    #[serde(default = "default_game")]
    pub game: String,

    /// Slot name used for the session handshake.
    #[serde(default = "default_slot_name")]
    pub slot_name: String,

    /// Session password (empty means none).
    #[serde(default)]
    pub password: String,

    /// Item-handling mode flags requested at handshake.
    #[serde(default = "default_items_handling")]
    pub items_handling: u32,

    /// Capability tags requested at handshake.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ConnectionConfig {
    /// Build the pass-through echo embedded in every snapshot document.
    pub fn echo(&self) -> ConnectionEcho {
        ConnectionEcho {
            host: self.host.clone(),
            port: self.port,
            game: self.game.clone(),
            slot_name: self.slot_name.clone(),
            password: self.password.clone(),
            items_handling: self.items_handling,
            tags: self.tags.clone(),
        }
    }
}

/// Storage locations for the snapshot document and the log file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Where the snapshot document is published.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,

    /// Optional log file. Absence leaves stdout-only logging.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl PathsConfig {
    /// Override storage paths with environment variables when set.
    ///
    /// This lets a deployment relocate the document and log without
    /// modifying the YAML config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WAYSTONE_SNAPSHOT_FILE") {
            self.snapshot_file = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("WAYSTONE_LOG_FILE") {
            self.log_file = Some(PathBuf::from(val));
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            log_file: None,
        }
    }
}

/// Flush cadence and loop pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetcherConfig {
    /// Seconds between periodic snapshot flushes.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Milliseconds the driver loop pauses between iterations.
    #[serde(default = "default_poll_pause_ms")]
    pub poll_pause_ms: u64,
}

impl FetcherConfig {
    /// The periodic flush interval as a [`Duration`].
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    /// The per-iteration loop pause as a [`Duration`].
    pub const fn poll_pause(&self) -> Duration {
        Duration::from_millis(self.poll_pause_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: default_flush_interval_secs(),
            poll_pause_ms: default_poll_pause_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "localhost".to_owned()
}

const fn default_port() -> u16 {
    38281
}

fn default_game() -> String {
    "Unknown Game".to_owned()
}

fn default_slot_name() -> String {
    "Player".to_owned()
}

const fn default_items_handling() -> u32 {
    7
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("data/snapshot.json")
}

const fn default_flush_interval_secs() -> u64 {
    2
}

const fn default_poll_pause_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_field_defaults() {
        let yaml = "connection: {}\n";
        let config = BridgeConfig::parse(yaml).unwrap();

        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 38281);
        assert_eq!(config.connection.game, "Unknown Game");
        assert_eq!(config.connection.slot_name, "Player");
        assert_eq!(config.connection.items_handling, 7);
        assert!(config.connection.tags.is_empty());
        assert_eq!(config.fetcher.flush_interval_secs, 2);
        assert_eq!(config.fetcher.poll_pause_ms, 50);
        assert_eq!(config.logging.level, "info");
        assert!(config.paths.log_file.is_none());
    }

    #[test]
    fn missing_connection_section_is_a_startup_failure() {
        let yaml = "paths:\n  snapshot_file: out.json\n";
        let result = BridgeConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
connection:
  host: "multiworld.example.net"
  port: 24242
  game: "Hollow Knight"
  slot_name: "Jade"
  password: "hunter2"
  items_handling: 7
  tags:
    - Tracker

paths:
  snapshot_file: "run/snapshot.json"
  log_file: "run/fetcher.log"

fetcher:
  flush_interval_secs: 5
  poll_pause_ms: 20

logging:
  level: "debug"
"#;
        let config = BridgeConfig::parse(yaml).unwrap();

        assert_eq!(config.connection.host, "multiworld.example.net");
        assert_eq!(config.connection.port, 24242);
        assert_eq!(config.connection.slot_name, "Jade");
        assert_eq!(config.connection.tags, vec![String::from("Tracker")]);
        assert_eq!(config.paths.snapshot_file, PathBuf::from("run/snapshot.json"));
        assert_eq!(config.paths.log_file, Some(PathBuf::from("run/fetcher.log")));
        assert_eq!(config.fetcher.flush_interval(), Duration::from_secs(5));
        assert_eq!(config.fetcher.poll_pause(), Duration::from_millis(20));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn echo_carries_the_whole_connection_section() {
        let yaml = "connection:\n  slot_name: Jade\n  tags: [Tracker]\n";
        let config = BridgeConfig::parse(yaml).unwrap();
        let echo = config.connection.echo();

        assert_eq!(echo.slot_name, "Jade");
        assert_eq!(echo.host, "localhost");
        assert_eq!(echo.tags, vec![String::from("Tracker")]);
    }

    #[test]
    fn from_file_reads_yaml_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waystone-config.yaml");
        std::fs::write(&path, "connection:\n  game: Hollow Knight\n").unwrap();

        let config = BridgeConfig::from_file(&path).unwrap();
        assert_eq!(config.connection.game, "Hollow Knight");
    }

    #[test]
    fn from_file_missing_file_is_io_error() {
        let result = BridgeConfig::from_file(Path::new("does/not/exist.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("waystone-config.yaml");
        if path.exists() {
            let config = BridgeConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
