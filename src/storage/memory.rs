//! Memory Storage
//!
//! In-process adapter for tests and ephemeral stores. Clones share the
//! same buffer, so a test can keep a handle after moving one into a
//! store.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Storage;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    /// Empty storage, as on a first run
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with raw contents
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        let storage = Self::default();
        *storage.contents.lock() = Some(contents.into());
        storage
    }

    /// Current raw contents
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().clone()
    }

    /// Current contents as text, for assertions
    pub fn contents_string(&self) -> Option<String> {
        self.contents()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Make subsequent writes fail with `io::ErrorKind::Other`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    fn read_all(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents.lock().clone())
    }

    fn write_all(&self, contents: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "simulated write failure",
            ));
        }
        *self.contents.lock() = Some(contents.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
