//! # Metadata Documents
//!
//! Each stored piece of content has a metadata document beside it. The index
//! only cares about its version tag, its fingerprint and a few hints used
//! by the destination layout; everything else (EXIF, image dimensions,
//! per-source activity) is an opaque payload carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rix_core::{ContentFingerprint, RixError};

use crate::migration::CURRENT_VERSION;

/// A per-content metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    /// Schema version tag.
    #[serde(default)]
    pub version: String,
    /// Fingerprint of the content this document describes.
    pub hash: ContentFingerprint,
    /// Content size in bytes.
    #[serde(default)]
    pub size: u64,
    /// IANA media type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// File extension (without the dot) to use when laying out the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Everything else, uninterpreted.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl MetaDocument {
    /// A current-version document with no hints and an empty payload.
    pub fn new(hash: ContentFingerprint, size: u64) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            hash,
            size,
            media_type: None,
            extension: None,
            payload: Map::new(),
        }
    }

    /// Set the extension hint.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Set the media type hint.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The extension the data file should carry, if any.
    ///
    /// An explicit extension wins; otherwise a few common media types map to
    /// their usual extension.
    pub fn preferred_extension(&self) -> Option<&str> {
        if let Some(ext) = self.extension.as_deref() {
            let ext = ext.trim_start_matches('.');
            return (!ext.is_empty()).then_some(ext);
        }
        match self.media_type.as_deref()? {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/heic" => Some("heic"),
            "video/mp4" => Some("mp4"),
            "video/quicktime" => Some("mov"),
            "application/pdf" => Some("pdf"),
            "text/plain" => Some("txt"),
            _ => None,
        }
    }

    /// Serialised bytes, as written next to the content.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RixError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::load_meta;
    use rix_core::FingerprintFormat;

    fn hash() -> ContentFingerprint {
        ContentFingerprint::from_bytes(b"testing 123", FingerprintFormat::LegacySha1).unwrap()
    }

    #[test]
    fn payload_round_trips() {
        let mut doc = MetaDocument::new(hash(), 11).with_media_type("image/jpeg");
        doc.payload.insert("exif".into(), serde_json::json!({"Make": "Canon"}));
        let bytes = doc.to_bytes().unwrap();
        let back = load_meta(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.payload["exif"]["Make"], "Canon");
    }

    #[test]
    fn preferred_extension() {
        assert_eq!(MetaDocument::new(hash(), 0).preferred_extension(), None);
        assert_eq!(
            MetaDocument::new(hash(), 0).with_media_type("image/png").preferred_extension(),
            Some("png")
        );
        assert_eq!(
            MetaDocument::new(hash(), 0)
                .with_media_type("image/png")
                .with_extension(".PNG")
                .preferred_extension(),
            Some("PNG")
        );
        assert_eq!(MetaDocument::new(hash(), 0).with_extension("").preferred_extension(), None);
    }

    #[test]
    fn legacy_meta_loads() {
        let text = r#"{"sha1": "b8dfb080bc33fb564249e34252bf143d88fc018f", "size": 11, "width": 640}"#;
        let doc = load_meta(text).unwrap();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert_eq!(doc.hash, hash());
        assert_eq!(doc.payload["width"], 640);
    }
}
