use crate::key::StorageKey;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path contained no characters that survive sanitization.
    #[error("invalid path: {raw:?}")]
    InvalidKey { raw: String },

    /// The document body is not well-formed JSON.
    #[error("invalid JSON data: {0}")]
    InvalidDocument(String),

    /// Admitting the write would push total storage past the budget.
    #[error(
        "Total storage limit exceeded. Current size: {:.2}MB, new file size: {:.2}MB, limit: {}MB",
        bytes_to_mb(*.current),
        bytes_to_mb(*.attempted),
        bytes_to_mb(*.limit)
    )]
    QuotaExceeded {
        current: u64,
        attempted: u64,
        limit: u64,
    },

    /// No document is stored under the key.
    #[error("document not found: {0}")]
    NotFound(StorageKey),

    /// The storage medium failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convert a byte count to mebibytes for human-facing output.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
