//! Temporary state store for tests.

use std::path::Path;
use tempfile::TempDir;

use crate::store::StateStore;

/// A [`StateStore`] rooted in a temporary directory.
///
/// Automatically cleans up when dropped.
pub struct StoreFixture {
    temp_dir: TempDir,
    store: StateStore,
}

impl StoreFixture {
    /// Create a fresh fixture with backups enabled.
    ///
    /// # Panics
    ///
    /// Panics if temporary directory creation fails.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = StateStore::new(temp_dir.path().join("state"));
        Self { temp_dir, store }
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The store under test.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Write a source document into the fixture and return its path as a
    /// string key.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write_source(&self, name: &str, content: &str) -> String {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write source file");
        path.to_string_lossy().into_owned()
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}
