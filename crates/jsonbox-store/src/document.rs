use serde::de::IgnoredAny;
use serde::Serialize;

use crate::error::{bytes_to_mb, StoreError, StoreResult};
use crate::key::StorageKey;

/// Check that `document` is a single well-formed JSON value.
///
/// The bytes are parsed but not kept; the store persists exactly what the
/// caller sent.
pub fn validate_document(document: &[u8]) -> StoreResult<()> {
    serde_json::from_slice::<IgnoredAny>(document)
        .map(|_| ())
        .map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

/// Outcome of an admitted write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutReceipt {
    pub key: StorageKey,
    /// Size of the document just written.
    pub size: u64,
    /// Total stored bytes after the write.
    pub total_bytes: u64,
    pub limit_bytes: u64,
}

impl PutReceipt {
    pub fn storage_used_mb(&self) -> f64 {
        bytes_to_mb(self.total_bytes)
    }
}

/// Point-in-time view of how much of the budget is in use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StorageUsage {
    pub documents: usize,
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

impl StorageUsage {
    pub fn used_mb(&self) -> f64 {
        bytes_to_mb(self.used_bytes)
    }

    pub fn remaining_bytes(&self) -> u64 {
        self.limit_bytes.saturating_sub(self.used_bytes)
    }
}
