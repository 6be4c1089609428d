//! Mock implementations for testing.
//!
//! [`MemoryPactStore`] keeps pact files in memory, keyed by the path the file
//! store would have used, so lifecycle tests need no file system.

use pact_ledger::{LedgerResult, Pact, PactFile, PactStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory pact store.
#[derive(Debug, Default)]
pub struct MemoryPactStore {
    files: Mutex<HashMap<PathBuf, PactFile>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemoryPactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with `file` at `path`.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, file: PactFile) -> Self {
        self.files.lock().insert(path.into(), file);
        self
    }

    /// Stored file at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<PactFile> {
        self.files.lock().get(path).cloned()
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Paths written so far, in write order.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().clone()
    }
}

impl PactStore for MemoryPactStore {
    fn read(&self, path: &Path) -> Option<PactFile> {
        self.get(path)
    }

    fn write(&self, pact: &Pact) -> LedgerResult<PathBuf> {
        let path = pact.file_name();
        self.files
            .lock()
            .insert(path.clone(), pact.generate_pact_file());
        self.writes.lock().push(path.clone());
        Ok(path)
    }

    fn delete(&self, pact: &Pact) -> LedgerResult<bool> {
        Ok(self.files.lock().remove(&pact.file_name()).is_some())
    }
}
