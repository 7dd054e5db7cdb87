//! # rix-cli — Command-Line Interface for the Reference Index
//!
//! Provides the `rix` binary. Every subcommand loads the index through
//! [`Workspace`], acts on it, and saves it back only when something changed.
//!
//! ## Subcommands
//!
//! - `rix init` — create an empty index file.
//! - `rix source add|list|remove` — manage searched locations.
//! - `rix dest add|list|remove` — manage storage locations.
//! - `rix hash` — print the fingerprint of a file.
//! - `rix record` — fingerprint a file and merge one observation.
//! - `rix show` — print everything known about a fingerprint.
//! - `rix export` — print every decomposed reference as JSON lines.
//! - `rix migrate` — upgrade an index or metadata document in place.
//! - `rix stats` — print index counts.
//!
//! ## Exit Status
//!
//! Handlers return `Ok(0)` on success and `Ok(1)` when the requested entity
//! does not exist. Errors propagate to `main`, which logs the chain and
//! exits with status 1.

pub mod config;
pub mod endpoint;
pub mod hash;
pub mod init;
pub mod migrate;
pub mod query;
pub mod record;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use rix_index::{IndexStore, ReferenceIndex};

use crate::config::RixConfig;

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Effective configuration.
    pub config: RixConfig,
    store: IndexStore,
}

impl Workspace {
    /// Combine the configuration with an optional `--index` override.
    pub fn new(config: RixConfig, index_override: Option<PathBuf>) -> Self {
        let path = index_override.unwrap_or_else(|| config.index.clone());
        Self {
            config,
            store: IndexStore::new(path),
        }
    }

    /// Path of the index file.
    pub fn index_path(&self) -> &Path {
        self.store.path()
    }

    /// The backing store.
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Load (and migrate, if needed) the index.
    pub fn load_index(&self) -> Result<ReferenceIndex> {
        self.store
            .load()
            .with_context(|| format!("failed to load index: {}", self.index_path().display()))
    }

    /// Persist the index.
    pub fn save_index(&self, index: &ReferenceIndex) -> Result<()> {
        self.store
            .save(index)
            .with_context(|| format!("failed to save index: {}", self.index_path().display()))
    }
}

/// Write `bytes` to `path` through a sibling temporary file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    let tmp = path.with_file_name(name);
    std::fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }
    Ok(())
}
