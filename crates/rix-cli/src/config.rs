//! # Configuration
//!
//! The CLI reads an optional YAML file, `rix.yaml` in the current directory
//! unless `--config` names another. Every field has a default, so an absent
//! file and an empty file behave the same. Unknown fields are rejected so
//! that a misspelt key fails loudly instead of being ignored.
//!
//! ```yaml
//! index: archive/index.json
//! fingerprint_format: v1   # legacy | v0 | v1
//! layout:
//!   shard_depth: 2
//!   shard_width: 2
//! ```
//!
//! A relative `index` path is resolved against the directory holding the
//! configuration file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use rix_core::{FingerprintFormat, LEGACY_HEX_LEN};
use rix_index::ShardedLayout;

/// File name looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "rix.yaml";

/// Index file used when neither the configuration nor `--index` names one.
pub const DEFAULT_INDEX_FILE: &str = "index.json";

/// Top-level CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RixConfig {
    /// Path of the reference index document.
    pub index: PathBuf,
    /// Encoding used for newly computed fingerprints.
    pub fingerprint_format: FingerprintFormat,
    /// Placement of content inside destinations.
    pub layout: LayoutConfig,
}

impl Default for RixConfig {
    fn default() -> Self {
        Self {
            index: PathBuf::from(DEFAULT_INDEX_FILE),
            fingerprint_format: FingerprintFormat::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Shard settings for the destination layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Number of shard directories above each file.
    pub shard_depth: usize,
    /// Hex characters per shard directory.
    pub shard_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let layout = ShardedLayout::default();
        Self {
            shard_depth: layout.depth,
            shard_width: layout.width,
        }
    }
}

impl LayoutConfig {
    /// The layout these settings describe.
    pub fn sharded(&self) -> ShardedLayout {
        ShardedLayout {
            depth: self.shard_depth,
            width: self.shard_width,
        }
    }
}

impl RixConfig {
    /// Parse a YAML document. Empty input yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).context("invalid configuration")?;
        if config.layout.shard_width == 0 && config.layout.shard_depth > 0 {
            bail!("layout.shard_width must be positive when shard_depth is set");
        }
        if config.layout.shard_width > LEGACY_HEX_LEN {
            bail!("layout.shard_width must be at most {LEGACY_HEX_LEN}");
        }
        Ok(config)
    }

    /// Load the configuration for this invocation.
    ///
    /// An explicit path must exist. Without one, `rix.yaml` in the current
    /// directory is used if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE}; using default configuration");
                    return Ok(Self::default());
                }
                candidate
            }
        };
        Self::from_file(&path)
    }

    /// Read and parse the file at `path`, anchoring a relative index path
    /// to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config =
            Self::from_yaml(&text).with_context(|| format!("in config file {}", path.display()))?;
        if config.index.is_relative() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                config.index = dir.join(&config.index);
            }
        }
        tracing::debug!(path = %path.display(), index = %config.index.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(RixConfig::from_yaml("").unwrap(), RixConfig::default());
        assert_eq!(RixConfig::from_yaml("{}").unwrap(), RixConfig::default());
    }

    #[test]
    fn defaults() {
        let config = RixConfig::default();
        assert_eq!(config.index, PathBuf::from("index.json"));
        assert_eq!(config.fingerprint_format, FingerprintFormat::CidV1);
        assert_eq!(config.layout.sharded(), ShardedLayout::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = RixConfig::from_yaml("fingerprint_format: legacy\nlayout:\n  shard_depth: 1\n").unwrap();
        assert_eq!(config.fingerprint_format, FingerprintFormat::LegacySha1);
        assert_eq!(config.layout.shard_depth, 1);
        assert_eq!(config.layout.shard_width, 2);
        assert_eq!(config.index, PathBuf::from("index.json"));
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(RixConfig::from_yaml("indx: typo.json\n").is_err());
        assert!(RixConfig::from_yaml("layout:\n  depth: 3\n").is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(RixConfig::from_yaml("fingerprint_format: sha256\n").is_err());
    }

    #[test]
    fn zero_width_rejected() {
        assert!(RixConfig::from_yaml("layout:\n  shard_width: 0\n").is_err());
        assert!(RixConfig::from_yaml("layout:\n  shard_width: 0\n  shard_depth: 0\n").is_ok());
    }

    #[test]
    fn width_beyond_digest_rejected() {
        assert!(RixConfig::from_yaml("layout:\n  shard_width: 40\n  shard_depth: 1\n").is_ok());
        let err = RixConfig::from_yaml("layout:\n  shard_width: 18446744073709551615\n").unwrap_err();
        assert!(err.to_string().contains("at most 40"));
    }

    #[test]
    fn relative_index_anchored_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rix.yaml");
        std::fs::write(&path, "index: data/index.json\n").unwrap();
        let config = RixConfig::from_file(&path).unwrap();
        assert_eq!(config.index, dir.path().join("data").join("index.json"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RixConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
