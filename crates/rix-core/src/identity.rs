//! # Endpoint Identities
//!
//! Newtype wrappers for Source and Destination identifiers, and the pure
//! functions that derive them. You cannot pass a [`SourceId`] where a
//! [`DestinationId`] is expected.
//!
//! ## Derivation
//!
//! Both identifiers are name-based (version 5) UUIDs. Each kind has its own
//! namespace UUID, itself derived from the URL namespace and the kind name,
//! so a Source and a Destination built from the same text never collide.
//! The same locations always yield the same identifier, in any process,
//! with no registry lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::location::Location;

/// Joins destination locations. Whitespace never appears in a parsed URI.
const LOCATION_SEPARATOR: &str = " ";

fn source_namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, b"Source")
}

fn destination_namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, b"Destination")
}

/// Identifier of a location that was searched for content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Uuid);

impl SourceId {
    /// Wrap an existing UUID, e.g. one read back from a document.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SourceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of a location content has been stored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(Uuid);

impl DestinationId {
    /// Wrap an existing UUID, e.g. one read back from a document.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DestinationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Derive the identifier of the Source at `source_uri`.
pub fn derive_source_id(source_uri: &Location) -> SourceId {
    SourceId(Uuid::new_v5(&source_namespace(), source_uri.as_str().as_bytes()))
}

/// Derive the identifier of a Destination from its three locations.
///
/// The order is fixed: index, data base, meta base.
pub fn derive_destination_id(index_uri: &Location, data_uri: &Location, meta_uri: &Location) -> DestinationId {
    let name = [index_uri.as_str(), data_uri.as_str(), meta_uri.as_str()].join(LOCATION_SEPARATOR);
    DestinationId(Uuid::new_v5(&destination_namespace(), name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn source_id_is_deterministic() {
        let a = derive_source_id(&loc("file:///photos/2019"));
        let b = derive_source_id(&loc("file:///photos/2019"));
        assert_eq!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 5);
    }

    #[test]
    fn source_id_differs_per_uri() {
        let a = derive_source_id(&loc("file:///photos/2019"));
        let b = derive_source_id(&loc("file:///photos/2020"));
        assert_ne!(a, b);
    }

    #[test]
    fn destination_id_depends_on_order() {
        let i = loc("s3://bucket/index.json");
        let d = loc("s3://bucket/data/");
        let m = loc("s3://bucket/meta/");
        let id = derive_destination_id(&i, &d, &m);
        assert_eq!(id, derive_destination_id(&i, &d, &m));
        assert_ne!(id, derive_destination_id(&i, &m, &d));
    }

    #[test]
    fn source_and_destination_namespaces_are_disjoint() {
        let u = loc("file:///x");
        let src = derive_source_id(&u);
        let dst = derive_destination_id(&u, &u, &u);
        assert_ne!(src.as_uuid(), dst.as_uuid());
        assert_ne!(source_namespace(), destination_namespace());
    }

    #[test]
    fn stable_across_releases() {
        // Identifiers are persisted; this value must never change.
        let id = derive_source_id(&loc("file:///photos/2019"));
        let again = SourceId::from_uuid(Uuid::new_v5(
            &Uuid::new_v5(&Uuid::NAMESPACE_URL, b"Source"),
            b"file:///photos/2019",
        ));
        assert_eq!(id, again);
    }

    #[test]
    fn serde_is_plain_uuid_string() {
        let id = derive_source_id(&loc("file:///a"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: SourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(id.to_string().parse::<SourceId>().unwrap(), id);
    }
}
