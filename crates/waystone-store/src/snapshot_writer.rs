//! Snapshot document publication.
//!
//! [`SnapshotWriter`] serializes a document with human-readable
//! indentation and publishes it by fully overwriting the target file.
//! Each flush moves through `Idle -> Serializing -> Writing -> Idle`;
//! both failure modes leave the writer back in `Idle`, so a failed flush
//! never prevents the next one from being attempted.
//!
//! I/O is synchronous by contract: a stalled write delays the caller's
//! next loop iteration but cannot corrupt in-memory state, which was
//! copied out before publication began.

use std::path::{Path, PathBuf};

use waystone_core::runner::{PublishError, SnapshotSink};
use waystone_types::SnapshotDocument;

use crate::error::StoreError;

/// Where the writer is within a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriterPhase {
    /// No flush in progress.
    #[default]
    Idle,
    /// Turning the document into JSON text.
    Serializing,
    /// Overwriting the target file.
    Writing,
}

/// Publishes snapshot documents to a fixed file path.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    phase: WriterPhase,
}

impl SnapshotWriter {
    /// Create a writer targeting the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            phase: WriterPhase::Idle,
        }
    }

    /// The target path the writer publishes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current phase. `Idle` between flushes, including after a
    /// failed one.
    pub const fn phase(&self) -> WriterPhase {
        self.phase
    }

    /// Serialize and publish one document, overwriting any prior version.
    ///
    /// Creates missing parent directories on first use. The file content
    /// is deterministic for a given document: flushing twice with no
    /// intervening state change yields byte-identical output.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] or [`StoreError::Io`]; the
    /// writer is back in `Idle` and reusable either way.
    pub fn write(&mut self, document: &SnapshotDocument) -> Result<(), StoreError> {
        let result = self.write_phases(document);
        self.phase = WriterPhase::Idle;
        result
    }

    fn write_phases(&mut self, document: &SnapshotDocument) -> Result<(), StoreError> {
        self.phase = WriterPhase::Serializing;
        let text = serde_json::to_string_pretty(document)?;

        self.phase = WriterPhase::Writing;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, text.as_bytes())?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = text.len(),
            "snapshot document written"
        );
        Ok(())
    }
}

impl SnapshotSink for SnapshotWriter {
    fn publish(&mut self, document: &SnapshotDocument) -> Result<(), PublishError> {
        self.write(document).map_err(|error| match error {
            StoreError::Serialize(source) => PublishError::Serialize {
                message: source.to_string(),
            },
            StoreError::Io(source) => PublishError::Storage {
                message: source.to_string(),
            },
        })
    }
}
