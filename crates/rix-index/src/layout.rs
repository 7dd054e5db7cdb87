//! # Destination Layout
//!
//! Decides where under a destination a piece of content and its metadata
//! document live. The index relies only on the [`Layout`] contract: the
//! result is a pure function of its inputs and distinct fingerprints never
//! share a location. That is what makes `(dst_id, data_uri, meta_uri)` a
//! sound placement key.

use serde::{Deserialize, Serialize};

use rix_core::{ContentFingerprint, Location, RixError};

use crate::endpoint::Destination;
use crate::meta::MetaDocument;

/// Maps content to the two locations recorded in a placement.
pub trait Layout {
    /// Returns `(data_location, meta_location)` for `hash` under `dst`.
    fn locate(
        &self,
        dst: &Destination,
        hash: &ContentFingerprint,
        meta: &MetaDocument,
    ) -> Result<(Location, Location), RixError>;
}

/// Shards content by the leading hex digits of its digest.
///
/// With `depth = 2, width = 2`, content whose digest starts `b8df…` is
/// placed at `<data>/b8/df/<fingerprint>.<ext>` with its metadata at
/// `<meta>/b8/df/<fingerprint>.json`. Shards come from the digest, not the
/// text form, so every encoding of the same content lands in the same shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShardedLayout {
    /// Number of shard directories.
    pub depth: usize,
    /// Hex characters per shard directory.
    pub width: usize,
}

impl Default for ShardedLayout {
    fn default() -> Self {
        Self { depth: 2, width: 2 }
    }
}

impl ShardedLayout {
    fn shard_path(&self, hash: &ContentFingerprint) -> String {
        let hex = hash.digest_hex();
        let mut path = String::new();
        for i in 0..self.depth {
            let Some(start) = i.checked_mul(self.width) else {
                break;
            };
            let Some(shard) = start.checked_add(self.width).and_then(|end| hex.get(start..end)) else {
                break;
            };
            path.push_str(shard);
            path.push('/');
        }
        path
    }
}

impl Layout for ShardedLayout {
    fn locate(
        &self,
        dst: &Destination,
        hash: &ContentFingerprint,
        meta: &MetaDocument,
    ) -> Result<(Location, Location), RixError> {
        let shard = self.shard_path(hash);
        let data_name = match meta.preferred_extension() {
            Some(ext) => format!("{shard}{hash}.{ext}"),
            None => format!("{shard}{hash}"),
        };
        let meta_name = format!("{shard}{hash}.json");

        let data = as_directory(&dst.data_uri)?.join(&data_name)?;
        let meta = as_directory(&dst.meta_uri)?.join(&meta_name)?;
        Ok((data, meta))
    }
}

/// Relative references resolve beneath a base only if it ends in `/`.
fn as_directory(base: &Location) -> Result<Location, RixError> {
    if base.as_str().ends_with('/') {
        return Ok(base.clone());
    }
    Ok(Location::parse(&format!("{}/", base.as_str()))?)
}
