//! # Index Store
//!
//! Loads and saves a [`ReferenceIndex`] as a JSON file. Loading migrates
//! documents written by older schema versions; saving always writes the
//! current schema.
//!
//! Saves are atomic with respect to readers: the document is written to a
//! sibling temporary file and renamed over the target. There is no locking;
//! two processes saving the same file race and the last rename wins.

use std::fs;
use std::path::{Path, PathBuf};

use rix_core::RixError;

use crate::index::ReferenceIndex;
use crate::migration;

/// A reference index persisted at a filesystem path.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// A store for the index file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the index file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the index, migrating it if needed.
    ///
    /// A missing file yields a fresh, empty index.
    pub fn load(&self) -> Result<ReferenceIndex, RixError> {
        if !self.exists() {
            tracing::debug!(path = %self.path.display(), "no index file; starting empty");
            return Ok(ReferenceIndex::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let index = migration::load_index(&text)?;
        tracing::debug!(path = %self.path.display(), stats = ?index.stats(), "index loaded");
        Ok(index)
    }

    /// Write the index, replacing any existing file.
    pub fn save(&self, index: &ReferenceIndex) -> Result<(), RixError> {
        let mut text = index.to_json()?;
        text.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, text.as_bytes())?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "index saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "index.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
