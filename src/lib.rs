//! # Shortly
//!
//! A persistent URL shortener core with:
//! - Stable, reproducible short codes (CRC-32 of the long URL, in hex)
//! - Linear-probe collision resolution with a bounded probe length
//! - A one-to-one mapping enforced in both directions
//! - Full-rewrite persistence through an atomic temp-file rename
//! - Single-writer/multi-reader concurrency model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller (CLI / front end)                     │
//! │              shorten(long_url)  expand(short_url)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    MappingStore                              │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          │            │            │
//!          ▼            ▼            ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐
//!   │  CodeGen  │ │   Index   │ │  Storage  │
//!   │ (CRC-32)  │ │ (RwLock)  │ │ (file/mem)│
//!   └───────────┘ └───────────┘ └───────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use shortly::{Config, MappingStore};
//!
//! let store = MappingStore::open(Config::default())?;
//! let short = store.shorten("https://example.com/a/long/path")?;
//! assert_eq!(store.expand(&short)?, "https://example.com/a/long/path");
//! # Ok::<(), shortly::ShortlyError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codegen;
pub mod record;
pub mod index;
pub mod storage;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ShortlyError};
pub use config::{Config, SyncStrategy, DEFAULT_DOMAIN};
pub use record::Mapping;
pub use store::{LoadReport, MappingStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Shortly
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
