//! Error types for the persistence layer.

/// Errors that can occur while publishing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serializing the document to JSON failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the document to durable storage failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
