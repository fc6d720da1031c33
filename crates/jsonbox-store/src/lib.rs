//! Quota-enforcing JSON document storage for jsonbox.
//!
//! Documents are addressed by caller-supplied paths that are flattened into
//! a [`StorageKey`] by the key sanitizer. Every backend tracks the total
//! number of stored bytes and refuses any write that would push that total
//! past a single global budget.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`FileDocumentStore`] -- one `{key}.json` file per document under a root
//!   directory, recovered by scanning on open
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A completed write never leaves the total above the budget.
//! 2. Admission, persistence and the size update happen under one write lock.
//! 3. Persist first, then update the tracked total.
//! 4. Readers see either the old or the new document, never a partial one.
//! 5. The store never interprets documents beyond checking they parse as JSON.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod document;
pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod quota;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use document::{validate_document, PutReceipt, StorageUsage};
pub use error::{StoreError, StoreResult};
pub use fs::FileDocumentStore;
pub use key::{sanitize, StorageKey};
pub use memory::InMemoryDocumentStore;
pub use quota::{QuotaIndex, DEFAULT_MAX_TOTAL_BYTES};
pub use traits::DocumentStore;
