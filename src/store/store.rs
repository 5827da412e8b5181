//! In-memory, ordered store of file records.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use super::record::{FileRecord, RecordPatch};

/// Thread-safe store for file records.
///
/// Records keep insertion order. Every read hands out an owned snapshot,
/// so callers never observe a write that lands while they iterate.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

#[derive(Debug)]
struct FileStoreInner {
    records: RwLock<Vec<FileRecord>>,
    /// Bumped on every effective mutation.
    revision: watch::Sender<u64>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(FileStoreInner {
                records: RwLock::new(Vec::new()),
                revision,
            }),
        }
    }

    /// Append records in the given order.
    pub fn add(&self, records: impl IntoIterator<Item = FileRecord>) {
        let added = {
            let mut guard = self.write();
            let before = guard.len();
            guard.extend(records);
            guard.len() - before
        };
        if added > 0 {
            self.bump();
        }
    }

    /// Remove a record by id.
    ///
    /// Returns the removed record, or `None` if the id is unknown.
    pub fn remove(&self, id: &str) -> Option<FileRecord> {
        let removed = {
            let mut guard = self.write();
            guard
                .iter()
                .position(|r| r.id == id)
                .map(|index| guard.remove(index))
        };
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// No-op if the id is absent. Returns the updated record.
    pub fn update(&self, id: &str, patch: &RecordPatch) -> Option<FileRecord> {
        let updated = {
            let mut guard = self.write();
            guard.iter_mut().find(|r| r.id == id).map(|slot| {
                *slot = slot.merged(patch);
                slot.clone()
            })
        };
        if updated.is_some() {
            self.bump();
        }
        updated
    }

    /// Remove every record.
    pub fn clear(&self) {
        let had_records = {
            let mut guard = self.write();
            let had = !guard.is_empty();
            guard.clear();
            had
        };
        if had_records {
            self.bump();
        }
    }

    /// Snapshot of all records in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<FileRecord> {
        self.read().clone()
    }

    /// Get a copy of a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<FileRecord> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current revision number.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Subscribe to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<FileRecord>> {
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<FileRecord>> {
        self.inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
