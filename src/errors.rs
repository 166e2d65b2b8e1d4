//! Error types for mdrecall
//!
//! One crate-wide error enum; binaries wrap it with anyhow at the edge.

use thiserror::Error;

/// Main error type for the retrieval store and its collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    /// The vector database cannot be reached or refused the connection
    #[error("Vector backend unavailable: {0}")]
    BackendUnavailable(String),

    /// `add`/`query` was called on the vector backend before its collection
    /// was initialized
    #[error("Collection not initialized: call init_collection before use")]
    CollectionNotInitialized,

    /// Batch columns passed to `add` are not the same length
    #[error("Mismatched batch: {field} has {actual} entries, expected {expected}")]
    MismatchedBatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Embedding request to Ollama failed
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// Vector database request failed after a successful connection
    #[error("Vector store request failed: {0}")]
    VectorRequest(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = StoreError::BackendUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_mismatched_batch_display() {
        let err = StoreError::MismatchedBatch {
            field: "texts",
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("texts"));
        assert!(msg.contains("3"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
