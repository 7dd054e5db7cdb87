//! # Endpoints
//!
//! Sources are locations searched for content; destinations are locations
//! content is stored to. Both carry an identifier derived from their
//! locations, so registering the same endpoint twice yields an equal value.

use serde::{Deserialize, Serialize};

use rix_core::{derive_destination_id, derive_source_id, DestinationId, Location, SourceId};

/// A location that was searched for content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Derived from `src_uri`.
    pub src_id: SourceId,
    /// Root of the searched location.
    pub src_uri: Location,
}

impl Source {
    /// Build a source, deriving its identifier from `uri`.
    pub fn new(uri: Location) -> Self {
        Self {
            src_id: derive_source_id(&uri),
            src_uri: uri,
        }
    }
}

/// A location content has been stored to.
///
/// `index_uri` is where the destination's own copy of the index lives;
/// `data_uri` and `meta_uri` are the bases content and metadata documents
/// are laid out under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Derived from the three locations below.
    pub dst_id: DestinationId,
    /// Location of the destination's index document.
    pub index_uri: Location,
    /// Base location for content data.
    pub data_uri: Location,
    /// Base location for metadata documents.
    pub meta_uri: Location,
}

impl Destination {
    /// Build a destination, deriving its identifier from its locations.
    pub fn new(index_uri: Location, data_uri: Location, meta_uri: Location) -> Self {
        Self {
            dst_id: derive_destination_id(&index_uri, &data_uri, &meta_uri),
            index_uri,
            data_uri,
            meta_uri,
        }
    }
}
