//! Storage Module
//!
//! Persistence adapters for the mapping set.
//!
//! ## Responsibilities
//! - Read the full persisted contents at startup
//! - Replace the full contents after every mutation
//! - Report a missing store as "nothing yet", not as an error
//!
//! The store never appends: every `write_all` carries the complete
//! current state, so the backing medium always reflects it.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::io;

/// Backing storage for a `MappingStore`
///
/// Contents are the text produced by `record::encode_all`. Adapters treat
/// them as opaque.
pub trait Storage: Send + Sync {
    /// Read everything, or `None` if nothing has been stored yet
    fn read_all(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace everything with `contents`
    fn write_all(&self, contents: &[u8]) -> io::Result<()>;

    /// Human-readable location, used in log lines
    fn describe(&self) -> String;
}
