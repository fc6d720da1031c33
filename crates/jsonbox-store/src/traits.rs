use crate::document::{PutReceipt, StorageUsage};
use crate::error::StoreResult;
use crate::key::StorageKey;

/// Budgeted JSON document store.
///
/// All implementations must satisfy these invariants:
/// - A completed `put` never leaves `total_size()` above `limit()`, even
///   under concurrent writers.
/// - A rejected or failed `put` leaves both the stored document and the
///   tracked total unchanged.
/// - `get` returns either the previous or the new document for a key being
///   replaced concurrently, never a partial one.
/// - `total_size()` equals the sum of the sizes of all stored documents.
pub trait DocumentStore: Send + Sync {
    /// Store `document` under the sanitized form of `raw_key`, replacing any
    /// previous document there.
    ///
    /// Fails with `InvalidKey`, `InvalidDocument`, `QuotaExceeded`, or
    /// `Persistence`.
    fn put(&self, raw_key: &str, document: &[u8]) -> StoreResult<PutReceipt>;

    /// Return a copy of the document stored under the sanitized `raw_key`.
    ///
    /// Fails with `InvalidKey`, `NotFound`, or `Persistence`.
    fn get(&self, raw_key: &str) -> StoreResult<Vec<u8>>;

    /// Sum of all stored document sizes in bytes.
    fn total_size(&self) -> u64;

    /// The global budget in bytes.
    fn limit(&self) -> u64;

    /// Number of stored documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored keys, sorted.
    fn keys(&self) -> Vec<StorageKey>;

    fn usage(&self) -> StorageUsage;
}
