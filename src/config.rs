//! Configuration for Shortly
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShortlyError};

/// Public prefix prepended to every short code
pub const DEFAULT_DOMAIN: &str = "https://short.ly/";

/// Default backing file, relative to the working directory
pub const DEFAULT_STORAGE_FILE: &str = "url_mappings.txt";

/// Main configuration for a MappingStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Backing file holding one `<code> <url>` record per line.
    /// Saves go through a sibling `<file>.tmp` that is renamed over it.
    pub storage_path: PathBuf,

    /// Durability of each save
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Code Generation Configuration
    // -------------------------------------------------------------------------
    /// Prefix for public short URLs, stripped again by `expand`
    pub domain: String,

    /// Upper bound on candidates examined per `shorten`
    pub max_probe_attempts: usize,
}

/// Save sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the temp file before renaming it into place (safest)
    EveryWrite,

    /// Leave flushing to the OS write-back cache
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_FILE),
            sync_strategy: SyncStrategy::EveryWrite,
            domain: DEFAULT_DOMAIN.to_string(),
            max_probe_attempts: 64,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the store cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(ShortlyError::Config("domain must not be empty".to_string()));
        }
        if self.domain.chars().any(char::is_whitespace) {
            return Err(ShortlyError::Config(format!(
                "domain must not contain whitespace: {:?}",
                self.domain
            )));
        }
        if self.max_probe_attempts == 0 {
            return Err(ShortlyError::Config(
                "max_probe_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    /// Set the save sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the public domain prefix
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    /// Set the collision probe bound
    pub fn max_probe_attempts(mut self, attempts: usize) -> Self {
        self.config.max_probe_attempts = attempts;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
