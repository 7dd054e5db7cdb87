//! # Schema Migration
//!
//! Every persisted index and metadata document carries a `version` tag.
//! Exactly two tags are recognised:
//!
//! - `""` (or a missing field): written before documents were versioned.
//! - [`CURRENT_VERSION`].
//!
//! Current documents are accepted unchanged. Legacy documents are stamped
//! with the current tag and have renamed fields moved to their new names.
//! Any other tag is rejected: its shape is unknown, so nothing in it may be
//! interpreted.
//!
//! ## Legacy Renames
//!
//! | document | legacy field                  | current field  |
//! |----------|-------------------------------|----------------|
//! | index    | `srcs[*].uri`                 | `src_uri`      |
//! | index    | `dsts[*].data_base_uri`       | `data_uri`     |
//! | index    | `dsts[*].meta_base_uri`       | `meta_uri`     |
//! | index    | `refs[*].dsts[*].created_at`  | `stored_at`    |
//! | meta     | `sha1`                        | `hash`         |
//!
//! When both names are present the current name wins and the legacy field
//! is left in place, so migration never discards data.

use serde_json::{Map, Value};
use thiserror::Error;

use rix_core::RixError;

use crate::index::ReferenceIndex;
use crate::meta::MetaDocument;

/// The schema version written by this release.
pub const CURRENT_VERSION: &str = "v1";

/// The tag carried by documents written before versioning.
pub const LEGACY_VERSION: &str = "";

/// A recognised schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Pre-versioning document (empty or missing tag).
    Legacy,
    /// The current schema.
    V1,
}

impl SchemaVersion {
    /// Classify a document by its `version` field.
    pub fn detect(document: &Value) -> Result<Self, MigrationError> {
        let obj = document
            .as_object()
            .ok_or_else(|| MigrationError::Malformed("document is not a JSON object".to_string()))?;
        match obj.get("version") {
            None | Some(Value::Null) => Ok(Self::Legacy),
            Some(Value::String(tag)) if tag == LEGACY_VERSION => Ok(Self::Legacy),
            Some(Value::String(tag)) if tag == CURRENT_VERSION => Ok(Self::V1),
            Some(Value::String(tag)) => Err(MigrationError::UnsupportedVersion(tag.clone())),
            Some(other) => Err(MigrationError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// What a migration did to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Already current; untouched.
    Current,
    /// Upgraded from the legacy schema.
    Upgraded,
}

/// Errors raised while migrating a document.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The version tag is not one this release understands.
    #[error("unsupported document version {0:?}")]
    UnsupportedVersion(String),

    /// The document does not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl From<MigrationError> for RixError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::UnsupportedVersion(version) => RixError::UnsupportedVersion { version },
            MigrationError::Malformed(msg) => RixError::Json(<serde_json::Error as serde::de::Error>::custom(msg)),
        }
    }
}

/// Upgrade an index document in place.
///
/// On error the document may be partly rewritten and must be discarded.
pub fn migrate_index_value(document: &mut Value) -> Result<MigrationOutcome, MigrationError> {
    if SchemaVersion::detect(document)? == SchemaVersion::V1 {
        return Ok(MigrationOutcome::Current);
    }
    let obj = as_object_mut(document)?;

    for src in entries_mut(obj, "srcs")? {
        rename_field(src, "uri", "src_uri");
    }
    for dst in entries_mut(obj, "dsts")? {
        rename_field(dst, "data_base_uri", "data_uri");
        rename_field(dst, "meta_base_uri", "meta_uri");
    }
    for uref in entries_mut(obj, "refs")? {
        for placement in entries_mut(uref, "dsts")? {
            rename_field(placement, "created_at", "stored_at");
        }
    }

    stamp_current(obj);
    tracing::info!(to = CURRENT_VERSION, "migrated legacy index document");
    Ok(MigrationOutcome::Upgraded)
}

/// Upgrade a metadata document in place.
pub fn migrate_meta_value(document: &mut Value) -> Result<MigrationOutcome, MigrationError> {
    if SchemaVersion::detect(document)? == SchemaVersion::V1 {
        return Ok(MigrationOutcome::Current);
    }
    let obj = as_object_mut(document)?;
    rename_field(obj, "sha1", "hash");
    stamp_current(obj);
    tracing::info!(to = CURRENT_VERSION, "migrated legacy meta document");
    Ok(MigrationOutcome::Upgraded)
}

/// Parse, migrate and decode an index document.
pub fn load_index(text: &str) -> Result<ReferenceIndex, RixError> {
    let mut document: Value = serde_json::from_str(text)?;
    migrate_index_value(&mut document).map_err(|e| {
        tracing::warn!(error = %e, "rejected index document");
        e
    })?;
    Ok(serde_json::from_value(document)?)
}

/// Parse, migrate and decode a metadata document.
pub fn load_meta(text: &str) -> Result<MetaDocument, RixError> {
    let mut document: Value = serde_json::from_str(text)?;
    migrate_meta_value(&mut document).map_err(|e| {
        tracing::warn!(error = %e, "rejected meta document");
        e
    })?;
    Ok(serde_json::from_value(document)?)
}

fn as_object_mut(document: &mut Value) -> Result<&mut Map<String, Value>, MigrationError> {
    document
        .as_object_mut()
        .ok_or_else(|| MigrationError::Malformed("document is not a JSON object".to_string()))
}

/// Objects of the array at `obj[key]`. A missing or null field is empty.
fn entries_mut<'a>(
    obj: &'a mut Map<String, Value>,
    key: &str,
) -> Result<impl Iterator<Item = &'a mut Map<String, Value>>, MigrationError> {
    let items: &mut [Value] = match obj.get_mut(key) {
        None | Some(Value::Null) => &mut [],
        Some(Value::Array(items)) => items,
        Some(_) => return Err(MigrationError::Malformed(format!("\"{key}\" is not an array"))),
    };
    if items.iter().any(|v| !v.is_object()) {
        return Err(MigrationError::Malformed(format!("\"{key}\" holds a non-object entry")));
    }
    Ok(items.iter_mut().filter_map(Value::as_object_mut))
}

fn rename_field(obj: &mut Map<String, Value>, legacy: &str, current: &str) {
    if obj.contains_key(current) {
        return;
    }
    if let Some(value) = obj.remove(legacy) {
        obj.insert(current.to_string(), value);
    }
}

fn stamp_current(obj: &mut Map<String, Value>) {
    obj.insert("version".to_string(), Value::String(CURRENT_VERSION.to_string()));
}
