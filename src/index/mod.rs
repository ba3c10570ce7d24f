//! Index Module
//!
//! In-memory bidirectional view of the mapping relation.
//!
//! ## Responsibilities
//! - Forward lookup: short code → long URL (`expand`)
//! - Reverse lookup: long URL → short code (`shorten` idempotence)
//! - Enforce the bijection on every insert
//! - Ordered iteration for deterministic saves
//!
//! ## Data Structure Choice
//! - Forward: `BTreeMap` so the saved file is sorted by code
//! - Reverse: `HashMap`, only ever point-queried
//!
//! The index holds no lock of its own; `MappingStore` wraps it in a
//! `RwLock`.

mod table;

pub use table::MappingIndex;

/// Outcome of inserting a record into the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New pair stored in both directions
    Inserted,

    /// The exact pair was already present
    AlreadyPresent,

    /// The code is taken by a different URL; nothing changed
    CodeConflict { existing_url: String },

    /// The URL already has a different code; nothing changed
    UrlConflict { existing_code: String },
}

impl InsertOutcome {
    /// True for `Inserted` only
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}
