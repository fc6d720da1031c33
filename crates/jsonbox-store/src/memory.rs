use std::collections::HashMap;
use std::sync::RwLock;

use crate::document::{validate_document, PutReceipt, StorageUsage};
use crate::error::{StoreError, StoreResult};
use crate::key::{sanitize, StorageKey};
use crate::quota::{QuotaIndex, DEFAULT_MAX_TOTAL_BYTES};
use crate::traits::DocumentStore;

struct MemoryState {
    index: QuotaIndex,
    documents: HashMap<StorageKey, Vec<u8>>,
}

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Documents and their size index live
/// behind one `RwLock`; documents are cloned on read and write.
pub struct InMemoryDocumentStore {
    state: RwLock<MemoryState>,
}

impl InMemoryDocumentStore {
    /// Create an empty store with the default 50 MiB budget.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_TOTAL_BYTES)
    }

    /// Create an empty store with a budget of `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                index: QuotaIndex::new(limit),
                documents: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn put(&self, raw_key: &str, document: &[u8]) -> StoreResult<PutReceipt> {
        let key = sanitize(raw_key)?;
        validate_document(document)?;
        let size = document.len() as u64;

        let mut state = self.state.write().expect("lock poisoned");
        state.index.admit(&key, size)?;
        state.documents.insert(key.clone(), document.to_vec());
        let total_bytes = state.index.commit(key.clone(), size);
        tracing::debug!(%key, size, total_bytes, "stored document in memory");

        Ok(PutReceipt {
            key,
            size,
            total_bytes,
            limit_bytes: state.index.limit(),
        })
    }

    fn get(&self, raw_key: &str) -> StoreResult<Vec<u8>> {
        let key = sanitize(raw_key)?;
        let state = self.state.read().expect("lock poisoned");
        state
            .documents
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    fn total_size(&self) -> u64 {
        self.state.read().expect("lock poisoned").index.total()
    }

    fn limit(&self) -> u64 {
        self.state.read().expect("lock poisoned").index.limit()
    }

    fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").index.len()
    }

    fn keys(&self) -> Vec<StorageKey> {
        self.state.read().expect("lock poisoned").index.keys()
    }

    fn usage(&self) -> StorageUsage {
        self.state.read().expect("lock poisoned").index.usage()
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let usage = self.usage();
        f.debug_struct("InMemoryDocumentStore")
            .field("documents", &usage.documents)
            .field("used_bytes", &usage.used_bytes)
            .field("limit_bytes", &usage.limit_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::json_of_size;
    use std::sync::{Arc, Barrier};
    use std::thread;

    // -----------------------------------------------------------------------
    // Core put/get
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get_round_trip() {
        let store = InMemoryDocumentStore::new();
        let doc = br#"{"name": "alice", "tags": ["a", "b"]}"#;
        let receipt = store.put("users/alice", doc).unwrap();
        assert_eq!(receipt.key.as_str(), "usersalice");
        assert_eq!(receipt.size, doc.len() as u64);
        assert_eq!(receipt.total_bytes, doc.len() as u64);

        assert_eq!(store.get("users/alice").unwrap(), doc.to_vec());
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            store.get("never-written"),
            Err(StoreError::NotFound(key)) if key.as_str() == "never-written"
        ));
    }

    #[test]
    fn colliding_paths_share_a_document() {
        let store = InMemoryDocumentStore::new();
        store.put("a/b", b"1").unwrap();
        store.put("ab", b"22").unwrap();
        assert_eq!(store.get("a/b").unwrap(), b"22");
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_size(), 2);
    }

    #[test]
    fn invalid_key_rejected_without_mutation() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(store.put("???", b"{}"), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(store.get("???"), Err(StoreError::InvalidKey { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_document_rejected_without_mutation() {
        let store = InMemoryDocumentStore::new();
        store.put("doc", b"{\"v\": 1}").unwrap();
        assert!(matches!(
            store.put("doc", b"{\"v\": "),
            Err(StoreError::InvalidDocument(_))
        ));
        assert_eq!(store.get("doc").unwrap(), b"{\"v\": 1}");
        assert_eq!(store.total_size(), 8);
    }

    // -----------------------------------------------------------------------
    // Size accounting
    // -----------------------------------------------------------------------

    #[test]
    fn replacement_accounting() {
        let store = InMemoryDocumentStore::new();
        store.put("other", &json_of_size(40)).unwrap();
        let before = store.total_size();

        store.put("k", &json_of_size(100)).unwrap();
        store.put("k", &json_of_size(30)).unwrap();
        assert_eq!(store.total_size(), before + 30);
    }

    #[test]
    fn budget_boundary() {
        let limit = DEFAULT_MAX_TOTAL_BYTES;
        let store = InMemoryDocumentStore::new();
        let receipt = store.put("a", &json_of_size(limit as usize)).unwrap();
        assert_eq!(receipt.total_bytes, limit);

        match store.put("b", b"1") {
            Err(StoreError::QuotaExceeded {
                current,
                attempted,
                limit: reported,
            }) => {
                assert_eq!(current, limit);
                assert_eq!(attempted, 1);
                assert_eq!(reported, limit);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        assert_eq!(store.total_size(), limit);
        assert!(matches!(store.get("b"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn replacement_fits_where_addition_would_not() {
        let store = InMemoryDocumentStore::with_limit(100);
        store.put("k", &json_of_size(80)).unwrap();
        store.put("k", &json_of_size(90)).unwrap();
        assert_eq!(store.total_size(), 90);
        assert!(store.put("j", &json_of_size(11)).is_err());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_admission_never_overshoots() {
        const WRITERS: u64 = 8;
        let limit = 8_000;
        let store = Arc::new(InMemoryDocumentStore::with_limit(limit));
        let barrier = Arc::new(Barrier::new(WRITERS as usize));

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let doc = json_of_size((limit / WRITERS + 1) as usize);
                    barrier.wait();
                    store.put(&format!("writer-{i}"), &doc).is_ok()
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|ok| *ok)
            .count() as u64;

        assert!(admitted <= WRITERS - 1);
        assert!(store.total_size() <= limit);
        assert_eq!(store.total_size(), admitted * (limit / WRITERS + 1));
    }

    #[test]
    fn readers_never_see_partial_documents() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let old = json_of_size(64 * 1024);
        let new = br#"{"replaced": true}"#.to_vec();
        store.put("shared", &old).unwrap();

        let writer = {
            let store = Arc::clone(&store);
            let (old, new) = (old.clone(), new.clone());
            thread::spawn(move || {
                for i in 0..200 {
                    let doc = if i % 2 == 0 { &new } else { &old };
                    store.put("shared", doc).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let (old, new) = (old.clone(), new.clone());
                thread::spawn(move || {
                    for _ in 0..200 {
                        let seen = store.get("shared").unwrap();
                        assert!(seen == old || seen == new);
                    }
                })
            })
            .collect();

        writer.join().expect("writer should not panic");
        for r in readers {
            r.join().expect("reader should not panic");
        }
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn keys_and_usage() {
        let store = InMemoryDocumentStore::with_limit(1_000);
        store.put("b", b"[]").unwrap();
        store.put("a", b"{}").unwrap();
        let keys: Vec<String> = store.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["a", "b"]);

        let usage = store.usage();
        assert_eq!(usage.documents, 2);
        assert_eq!(usage.used_bytes, 4);
        assert_eq!(usage.limit_bytes, 1_000);
    }

    #[test]
    fn default_creates_empty_store() {
        let store = InMemoryDocumentStore::default();
        assert!(store.is_empty());
        assert_eq!(store.limit(), DEFAULT_MAX_TOTAL_BYTES);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDocumentStore::new();
        store.put("x", b"1").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDocumentStore"));
        assert!(debug.contains("used_bytes"));
    }
}
