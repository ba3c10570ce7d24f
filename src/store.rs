//! Store Module
//!
//! The mapping engine that coordinates code generation, the in-memory
//! index and persistence.
//!
//! ## Responsibilities
//! - Shorten: reuse or generate a code, then persist the full set
//! - Expand: strip the domain and look the code up
//! - Rebuild the index from storage on startup
//! - Keep memory authoritative when a save fails

use std::borrow::Cow;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::codegen::{base_code, resolve_code, CodeHasher, Crc32Hasher};
use crate::config::Config;
use crate::error::{Result, ShortlyError};
use crate::index::{InsertOutcome, MappingIndex};
use crate::record::{self, Mapping};
use crate::storage::{FileStorage, Storage};

/// Statistics from rebuilding the index at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Whether the backing storage existed
    pub storage_found: bool,

    /// Records now present in the index
    pub records_loaded: usize,

    /// Lines with the wrong shape (field count, empty fields, bad UTF-8)
    pub records_skipped: usize,

    /// Well-formed records dropped because they contradict an earlier one
    pub records_conflicting: usize,
}

/// Bidirectional long URL ↔ short code store
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (shorten/save): Serialized by `write_lock`
///   - Only ONE writer at a time, held across insert and save so the
///     file never lags behind a concurrent insert's snapshot
///
/// - **Reads** (expand, idempotent shorten hits): `index` read lock only
///   - Many concurrent readers, blocked only during the brief insert
pub struct MappingStore {
    /// Store configuration
    config: Config,

    /// Hash used for base codes
    hasher: Box<dyn CodeHasher>,

    /// Backing storage (single source of truth at rest)
    storage: Box<dyn Storage>,

    /// Forward and reverse index (cache of storage)
    index: RwLock<MappingIndex>,

    /// Serializes mutating operations
    write_lock: Mutex<()>,

    /// Set when memory holds records the storage has not seen
    dirty: AtomicBool,

    /// What `load` found at startup
    load_report: LoadReport,
}

impl MappingStore {
    /// Open the store backed by `config.storage_path`
    ///
    /// A missing file yields an empty store.
    pub fn open(config: Config) -> Result<Self> {
        let storage = FileStorage::new(config.storage_path.clone(), config.sync_strategy);
        Self::with_parts(config, storage, Crc32Hasher)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified storage file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().storage_path(path).build();
        Self::open(config)
    }

    /// Open over an arbitrary storage adapter
    pub fn with_storage(config: Config, storage: impl Storage + 'static) -> Result<Self> {
        Self::with_parts(config, storage, Crc32Hasher)
    }

    /// Open over an arbitrary storage adapter and hash
    pub fn with_parts(
        config: Config,
        storage: impl Storage + 'static,
        hasher: impl CodeHasher + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let (index, load_report) = Self::load(&storage)?;

        Ok(Self {
            config,
            hasher: Box::new(hasher),
            storage: Box::new(storage),
            index: RwLock::new(index),
            write_lock: Mutex::new(()),
            dirty: AtomicBool::new(false),
            load_report,
        })
    }

    /// Rebuild the index from storage
    ///
    /// Malformed and conflicting records are skipped; only a failure to
    /// read the storage at all is an error.
    fn load(storage: &dyn Storage) -> Result<(MappingIndex, LoadReport)> {
        let mut index = MappingIndex::new();
        let mut report = LoadReport::default();

        let contents = match storage.read_all().map_err(ShortlyError::persistence)? {
            Some(contents) => contents,
            None => {
                tracing::info!(storage = %storage.describe(), "No existing mappings found, starting fresh");
                return Ok((index, report));
            }
        };
        report.storage_found = true;

        let decoded = record::decode_all(&contents);
        for line in &decoded.malformed_lines {
            tracing::warn!(storage = %storage.describe(), line, "Skipping malformed record");
        }
        report.records_skipped = decoded.malformed_lines.len();

        for mapping in decoded.records {
            let shown = mapping.to_string();
            match index.insert(mapping) {
                InsertOutcome::Inserted => report.records_loaded += 1,
                InsertOutcome::AlreadyPresent => {}
                InsertOutcome::CodeConflict { existing_url } => {
                    report.records_conflicting += 1;
                    tracing::warn!(record = %shown, %existing_url, "Skipping record: code already mapped");
                }
                InsertOutcome::UrlConflict { existing_code } => {
                    report.records_conflicting += 1;
                    tracing::warn!(record = %shown, %existing_code, "Skipping record: URL already mapped");
                }
            }
        }

        tracing::info!(
            storage = %storage.describe(),
            loaded = report.records_loaded,
            skipped = report.records_skipped,
            conflicting = report.records_conflicting,
            "Loaded mappings"
        );

        Ok((index, report))
    }

    /// Map a long URL to its short URL, creating the mapping if needed
    ///
    /// Repeated calls with the same input return the same short URL and
    /// do not touch storage. A new mapping is persisted before returning;
    /// if that write fails the mapping is kept in memory and
    /// `ShortlyError::Persistence` carries the assigned short URL.
    pub fn shorten(&self, long_url: &str) -> Result<String> {
        validate_long_url(long_url)?;

        if let Some(code) = self.index.read().code_for(long_url) {
            return Ok(self.short_url(code));
        }

        let _write_guard = self.write_lock.lock();

        let code = {
            let mut index = self.index.write();

            // Another writer may have inserted it while we waited
            if let Some(code) = index.code_for(long_url) {
                return Ok(self.short_url(code));
            }

            let base = base_code(self.hasher.as_ref(), long_url);
            let code = resolve_code(&base, self.config.max_probe_attempts, |candidate| {
                index.contains_code(candidate)
            })?;

            let outcome = index.insert(Mapping::new(code.clone(), long_url));
            debug_assert!(outcome.is_inserted(), "probe returned a taken code");
            code
        };
        self.dirty.store(true, Ordering::SeqCst);

        let short_url = self.short_url(&code);
        tracing::debug!(%long_url, %short_url, "Created mapping");

        self.save_locked()
            .map_err(|source| ShortlyError::Persistence {
                short_url: Some(short_url.clone()),
                source,
            })?;

        Ok(short_url)
    }

    /// Resolve a short URL (or bare code) to its long URL
    ///
    /// The domain is removed wherever it occurs, so
    /// `"https://short.ly/https://short.ly/abc"` looks up `abc`.
    pub fn expand(&self, short_url: &str) -> Result<String> {
        let code = self.short_code_of(short_url);

        match self.index.read().url_for(&code) {
            Some(long_url) => {
                tracing::debug!(%short_url, %long_url, "Expanded");
                Ok(long_url.to_string())
            }
            None => Err(ShortlyError::NotFound(short_url.to_string())),
        }
    }

    /// Write the full mapping set to storage
    ///
    /// Only writes when memory holds changes storage has not seen, such
    /// as a mapping whose save failed earlier.
    pub fn save(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        if !self.is_dirty() {
            return Ok(());
        }

        self.save_locked().map_err(ShortlyError::persistence)
    }

    /// Internal save (called with write lock held)
    fn save_locked(&self) -> std::io::Result<()> {
        let contents = {
            let index = self.index.read();
            record::encode_all(index.iter())
        };

        match self.storage.write_all(contents.as_bytes()) {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                tracing::debug!(storage = %self.storage.describe(), bytes = contents.len(), "Saved mappings");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(storage = %self.storage.describe(), error = %e, "Failed to save mappings, keeping in-memory state");
                Err(e)
            }
        }
    }

    /// Code part of a short URL
    ///
    /// Removes every occurrence of the configured domain, wherever it
    /// appears; input without the domain is taken as a bare code.
    pub fn short_code_of<'a>(&self, short_url: &'a str) -> Cow<'a, str> {
        let domain = self.config.domain.as_str();
        if short_url.contains(domain) {
            Cow::Owned(short_url.replace(domain, ""))
        } else {
            Cow::Borrowed(short_url)
        }
    }

    fn short_url(&self, code: &str) -> String {
        format!("{}{}", self.config.domain, code)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    pub fn contains_code(&self, short_code: &str) -> bool {
        self.index.read().contains_code(short_code)
    }

    pub fn contains_url(&self, long_url: &str) -> bool {
        self.index.read().contains_url(long_url)
    }

    /// Snapshot of all mappings in ascending code order
    pub fn mappings(&self) -> Vec<Mapping> {
        self.index.read().to_records()
    }

    /// True while an unsaved mapping exists
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// What startup loading found
    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    /// Public domain prefix
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Accept any non-empty string the line format can hold
///
/// Spaces, newlines and carriage returns would split or truncate the
/// stored record; every other character is kept as-is.
fn validate_long_url(long_url: &str) -> Result<()> {
    if long_url.is_empty() {
        return Err(ShortlyError::InvalidUrl("URL must not be empty".to_string()));
    }
    if !record::is_valid_field(long_url) {
        return Err(ShortlyError::InvalidUrl(format!(
            "URL must not contain spaces or line breaks: {:?}",
            long_url
        )));
    }
    Ok(())
}
