//! Error types for Shortly
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ShortlyError
pub type Result<T> = std::result::Result<T, ShortlyError>;

/// Unified error type for Shortly operations
#[derive(Debug, Error)]
pub enum ShortlyError {
    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    /// Reading or writing the backing storage failed.
    ///
    /// When raised by `shorten`, `short_url` carries the URL that was
    /// assigned in memory before the write failed.
    #[error("Persistence error: {source}")]
    Persistence {
        short_url: Option<String>,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Short URL not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // -------------------------------------------------------------------------
    // Code Generation Errors
    // -------------------------------------------------------------------------
    #[error("No free short code after {attempts} probe attempts")]
    CodeSpaceExhausted { attempts: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShortlyError {
    /// Wrap an I/O failure against the backing storage
    pub fn persistence(source: std::io::Error) -> Self {
        ShortlyError::Persistence {
            short_url: None,
            source,
        }
    }

    /// Returns true if this is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShortlyError::NotFound(_))
    }
}
