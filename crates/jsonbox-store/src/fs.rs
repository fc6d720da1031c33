//! Durable backend: one `{key}.json` file per document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use fs4::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::document::{validate_document, PutReceipt, StorageUsage};
use crate::error::{StoreError, StoreResult};
use crate::key::{sanitize, StorageKey};
use crate::quota::QuotaIndex;
use crate::traits::DocumentStore;

/// Filesystem document store rooted at a single directory.
///
/// The size index is rebuilt from the directory contents on [`open`] and
/// afterwards maintained incrementally. Writes go to a temporary file in the
/// same directory, are synced, and are then renamed over the target, so a
/// document file is always either the old or the new full value.
///
/// The index lock is held for the whole admit/persist/commit sequence of a
/// `put`, and for the file read of a `get`. An exclusive lock on
/// [`LOCK_FILE_NAME`] in the root is held for the store's lifetime, so no
/// other process can write under the same root with its own running total.
///
/// [`open`]: FileDocumentStore::open
pub struct FileDocumentStore {
    root: PathBuf,
    index: RwLock<QuotaIndex>,
    // Released when the store is dropped.
    _root_lock: File,
}

/// Lock file claimed by the process that owns a storage root.
pub const LOCK_FILE_NAME: &str = ".jsonbox.lock";

impl FileDocumentStore {
    /// Open (or create) a store rooted at `root` with a budget of `limit` bytes.
    pub fn open(root: impl AsRef<Path>, limit: u64) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let root_lock = lock_root(&root)?;

        let index = QuotaIndex::from_entries(limit, scan_documents(&root)?);
        if index.total() > limit {
            warn!(
                root = %root.display(),
                used_bytes = index.total(),
                limit_bytes = limit,
                "existing documents exceed the storage budget; only writes that bring the total within budget will be admitted"
            );
        }
        info!(
            root = %root.display(),
            documents = index.len(),
            used_bytes = index.total(),
            limit_bytes = limit,
            "opened document store"
        );

        Ok(Self {
            root,
            index: RwLock::new(index),
            _root_lock: root_lock,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Write `document` to a temp file, sync it, rename it into place, then
    /// sync the directory so the rename survives a crash.
    fn persist(&self, key: &StorageKey, document: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(document)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        sync_dir(&self.root)
    }
}

/// Take the exclusive lock on `root`, failing if another store holds it.
fn lock_root(root: &Path) -> io::Result<File> {
    let path = root.join(LOCK_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(err) if err.kind() == ErrorKind::WouldBlock => Err(io::Error::new(
            ErrorKind::WouldBlock,
            format!("storage root {} is already in use", root.display()),
        )),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directory handles cannot be synced on this platform; the rename is
// already durable once it returns.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Collect `(key, size)` for every document file directly under `root`.
fn scan_documents(root: &Path) -> io::Result<Vec<(StorageKey, u64)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let key = match name.to_str().and_then(StorageKey::from_file_name) {
            Some(key) => key,
            None => {
                debug!(file = ?name, "skipping non-document file");
                continue;
            }
        };
        entries.push((key, entry.metadata()?.len()));
    }
    Ok(entries)
}

impl DocumentStore for FileDocumentStore {
    fn put(&self, raw_key: &str, document: &[u8]) -> StoreResult<PutReceipt> {
        let key = sanitize(raw_key)?;
        validate_document(document)?;
        let size = document.len() as u64;

        let mut index = self.index.write().expect("lock poisoned");
        if let Err(e) = index.admit(&key, size) {
            warn!(%key, size, "rejected write: {e}");
            return Err(e);
        }
        self.persist(&key, document)?;
        let total_bytes = index.commit(key.clone(), size);
        debug!(%key, size, total_bytes, "stored document");

        Ok(PutReceipt {
            key,
            size,
            total_bytes,
            limit_bytes: index.limit(),
        })
    }

    fn get(&self, raw_key: &str) -> StoreResult<Vec<u8>> {
        let key = sanitize(raw_key)?;
        let index = self.index.read().expect("lock poisoned");
        if !index.contains(&key) {
            return Err(StoreError::NotFound(key));
        }
        let document = fs::read(self.path_for(&key))?;
        debug!(%key, size = document.len(), "read document");
        Ok(document)
    }

    fn total_size(&self) -> u64 {
        self.index.read().expect("lock poisoned").total()
    }

    fn limit(&self) -> u64 {
        self.index.read().expect("lock poisoned").limit()
    }

    fn len(&self) -> usize {
        self.index.read().expect("lock poisoned").len()
    }

    fn keys(&self) -> Vec<StorageKey> {
        self.index.read().expect("lock poisoned").keys()
    }

    fn usage(&self) -> StorageUsage {
        self.index.read().expect("lock poisoned").usage()
    }
}

impl std::fmt::Debug for FileDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let usage = self.usage();
        f.debug_struct("FileDocumentStore")
            .field("root", &self.root)
            .field("documents", &usage.documents)
            .field("used_bytes", &usage.used_bytes)
            .finish()
    }
}
