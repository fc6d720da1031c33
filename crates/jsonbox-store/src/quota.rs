//! Size accounting and budget admission shared by every backend.
//!
//! [`QuotaIndex`] is plain data with no locking of its own. Backends keep it
//! behind a `RwLock` and hold the write guard from [`QuotaIndex::admit`]
//! through [`QuotaIndex::commit`], which makes check-then-write atomic with
//! respect to other writers.

use std::collections::HashMap;

use crate::document::StorageUsage;
use crate::error::{StoreError, StoreResult};
use crate::key::StorageKey;

/// Default global budget: 50 MiB.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 50 * 1024 * 1024;

/// Per-key stored sizes plus their running sum.
#[derive(Clone, Debug)]
pub struct QuotaIndex {
    limit: u64,
    sizes: HashMap<StorageKey, u64>,
    total: u64,
}

impl QuotaIndex {
    /// Create an empty index with the given budget in bytes.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            sizes: HashMap::new(),
            total: 0,
        }
    }

    /// Build an index from already persisted documents.
    ///
    /// The recovered total may exceed `limit` if the budget was lowered
    /// since the documents were written; such an index only admits writes
    /// that bring the total back within the budget.
    pub fn from_entries(limit: u64, entries: impl IntoIterator<Item = (StorageKey, u64)>) -> Self {
        let mut index = Self::new(limit);
        for (key, size) in entries {
            index.commit(key, size);
        }
        index
    }

    /// Check whether replacing `key` with `new_size` bytes fits the budget.
    ///
    /// Returns the projected total on success. Never mutates.
    pub fn admit(&self, key: &StorageKey, new_size: u64) -> StoreResult<u64> {
        let existing = self.size_of(key).unwrap_or(0);
        let projected = (self.total - existing).saturating_add(new_size);
        if projected > self.limit {
            return Err(StoreError::QuotaExceeded {
                current: self.total,
                attempted: new_size,
                limit: self.limit,
            });
        }
        Ok(projected)
    }

    /// Record that `key` now holds `size` bytes. Returns the new total.
    pub fn commit(&mut self, key: StorageKey, size: u64) -> u64 {
        let existing = self.sizes.insert(key, size).unwrap_or(0);
        self.total = self.total - existing + size;
        self.total
    }

    pub fn size_of(&self, key: &StorageKey) -> Option<u64> {
        self.sizes.get(key).copied()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.sizes.contains_key(key)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<StorageKey> {
        let mut keys: Vec<StorageKey> = self.sizes.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn usage(&self) -> StorageUsage {
        StorageUsage {
            documents: self.len(),
            used_bytes: self.total,
            limit_bytes: self.limit,
        }
    }
}
