//! File Storage
//!
//! Plain-text file adapter with atomic replacement.
//!
//! ## Write Path
//! ```text
//!   contents ──► <file>.tmp ──flush──► [fsync] ──rename──► <file>
//! ```
//! `rename` replaces the target in one step, so a reader (or a crash)
//! sees either the previous file or the new one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Storage;
use crate::config::SyncStrategy;

/// Suffix of the scratch file used during saves
const TMP_SUFFIX: &str = ".tmp";

/// Stores the mapping set in a single text file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    sync_strategy: SyncStrategy,
}

impl FileStorage {
    /// Create an adapter for `path`; nothing is touched on disk yet
    pub fn new(path: impl Into<PathBuf>, sync_strategy: SyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync_strategy,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the scratch file written before each rename
    pub fn tmp_path(&self) -> io::Result<PathBuf> {
        let name = self.path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage path has no file name: {}", self.path.display()),
            )
        })?;
        let mut tmp_name = OsString::from(name);
        tmp_name.push(TMP_SUFFIX);
        Ok(self.path.with_file_name(tmp_name))
    }

    fn write_tmp(&self, tmp_path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(tmp_path)?);
        writer.write_all(contents)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;

        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Persist the rename itself by syncing the parent directory
    #[cfg(unix)]
    fn sync_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
            _ => File::open(".")?.sync_all(),
        }
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read_all(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, contents: &[u8]) -> io::Result<()> {
        let tmp_path = self.tmp_path()?;

        if let Err(e) = self.write_tmp(&tmp_path, contents) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if self.sync_strategy == SyncStrategy::EveryWrite {
            if let Err(e) = self.sync_parent_dir() {
                tracing::warn!(path = %self.path.display(), error = %e, "Directory sync after rename failed");
            }
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
