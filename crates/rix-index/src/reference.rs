//! # References
//!
//! A [`Reference`] is one observation: a fingerprint, where it was seen, and
//! where it was stored. References are folded into a [`UniversalReference`]
//! per fingerprint; the aggregate can be expanded back into references with
//! [`UniversalReference::decompose`].
//!
//! ## Merge Keys
//!
//! - Sightings are unique by `(src_id, data_uri, meta_uri)`. `modified_at` is
//!   the only mutable field.
//! - Placements are unique by `(dst_id, data_uri, meta_uri)`. `data_size`,
//!   `meta_size` and `updated_at` are mutable; `stored_at` is set once.
//!
//! Keying on the full location tuple lets one source or destination hold
//! several copies of the same content (renamed or duplicated files).

use serde::{Deserialize, Serialize};

use rix_core::temporal::optional;
use rix_core::{ContentFingerprint, DestinationId, Location, SourceId, Timestamp};

/// Content found at a place within a Source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSighting {
    /// The source the content was found in.
    pub src_id: SourceId,
    /// Where the content bytes were found.
    pub data_uri: Location,
    /// Where the source's own metadata for the content was found.
    pub meta_uri: Location,
    /// Last modification time at the source.
    #[serde(with = "optional", default)]
    pub modified_at: Option<Timestamp>,
}

impl SourceSighting {
    /// Whether `other` describes the same place within the same source.
    pub fn same_key(&self, other: &Self) -> bool {
        self.src_id == other.src_id && self.data_uri == other.data_uri && self.meta_uri == other.meta_uri
    }
}

/// Content stored at a place within a Destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPlacement {
    /// The destination the content was stored to.
    pub dst_id: DestinationId,
    /// Where the content bytes were stored.
    pub data_uri: Location,
    /// Where the metadata document was stored.
    pub meta_uri: Location,
    /// Size of the stored content in bytes.
    #[serde(default)]
    pub data_size: u64,
    /// Size of the stored metadata document in bytes.
    #[serde(default)]
    pub meta_size: u64,
    /// First time the content was stored here. Never overwritten.
    #[serde(with = "optional", default)]
    pub stored_at: Option<Timestamp>,
    /// Last time the stored copy was rewritten.
    #[serde(with = "optional", default)]
    pub updated_at: Option<Timestamp>,
}

impl DestinationPlacement {
    /// Whether `other` describes the same place within the same destination.
    pub fn same_key(&self, other: &Self) -> bool {
        self.dst_id == other.dst_id && self.data_uri == other.data_uri && self.meta_uri == other.meta_uri
    }

    /// Fold the mutable fields of `incoming` into `self`.
    ///
    /// `stored_at` is only filled when it was never recorded. Returns
    /// whether anything changed.
    fn update_from(&mut self, incoming: &Self) -> bool {
        let mut changed = false;
        if self.data_size != incoming.data_size {
            self.data_size = incoming.data_size;
            changed = true;
        }
        if self.meta_size != incoming.meta_size {
            self.meta_size = incoming.meta_size;
            changed = true;
        }
        if self.updated_at != incoming.updated_at {
            self.updated_at = incoming.updated_at;
            changed = true;
        }
        if self.stored_at.is_none() && incoming.stored_at.is_some() {
            self.stored_at = incoming.stored_at;
            changed = true;
        }
        changed
    }
}

/// One observation of a fingerprint: a single sighting and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The content's fingerprint.
    pub hash: ContentFingerprint,
    /// Where it was found.
    pub src: SourceSighting,
    /// Where it was stored.
    pub dst: DestinationPlacement,
}

impl Reference {
    /// Assemble an observation.
    pub fn new(hash: ContentFingerprint, src: SourceSighting, dst: DestinationPlacement) -> Self {
        Self { hash, src, dst }
    }
}

/// Every sighting and placement observed for one fingerprint.
///
/// Either side may be empty: content can be discovered before it is
/// stored, or imported into a destination before its provenance is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversalReference {
    /// Fingerprint this aggregate was first recorded under.
    pub hash: ContentFingerprint,
    /// Sightings, unique by `(src_id, data_uri, meta_uri)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub srcs: Vec<SourceSighting>,
    /// Placements, unique by `(dst_id, data_uri, meta_uri)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dsts: Vec<DestinationPlacement>,
}

impl UniversalReference {
    /// An aggregate with no sightings and no placements yet.
    pub fn new(hash: ContentFingerprint) -> Self {
        Self {
            hash,
            srcs: Vec::new(),
            dsts: Vec::new(),
        }
    }

    /// Merge a sighting. Returns whether the aggregate changed.
    pub fn add_sighting(&mut self, sighting: &SourceSighting) -> bool {
        match self.srcs.iter_mut().find(|s| s.same_key(sighting)) {
            Some(existing) if existing == sighting => false,
            Some(existing) => {
                existing.modified_at = sighting.modified_at;
                true
            }
            None => {
                self.srcs.push(sighting.clone());
                true
            }
        }
    }

    /// Merge a placement. Returns whether the aggregate changed.
    pub fn add_placement(&mut self, placement: &DestinationPlacement) -> bool {
        match self.dsts.iter_mut().find(|p| p.same_key(placement)) {
            Some(existing) => existing.update_from(placement),
            None => {
                self.dsts.push(placement.clone());
                true
            }
        }
    }

    /// Whether the aggregate holds neither sightings nor placements.
    pub fn is_empty(&self) -> bool {
        self.srcs.is_empty() && self.dsts.is_empty()
    }

    /// Expand into every sighting × placement pair.
    ///
    /// Yields nothing unless both sides are non-empty. Each call produces a
    /// fresh sequence.
    pub fn decompose(&self) -> impl Iterator<Item = Reference> + '_ {
        self.srcs.iter().flat_map(move |src| {
            self.dsts
                .iter()
                .map(move |dst| Reference::new(self.hash.clone(), src.clone(), dst.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rix_core::{derive_destination_id, derive_source_id, FingerprintFormat};

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn ts(s: &str) -> Option<Timestamp> {
        Some(Timestamp::parse(s).unwrap())
    }

    fn sighting(path: &str, modified: &str) -> SourceSighting {
        SourceSighting {
            src_id: derive_source_id(&loc("file:///src/")),
            data_uri: loc(&format!("file:///src/{path}")),
            meta_uri: loc(&format!("file:///src/{path}.xmp")),
            modified_at: ts(modified),
        }
    }

    fn placement(path: &str, size: u64, updated: &str) -> DestinationPlacement {
        let base = loc("s3://b/");
        DestinationPlacement {
            dst_id: derive_destination_id(&base, &base, &base),
            data_uri: loc(&format!("s3://b/data/{path}")),
            meta_uri: loc(&format!("s3://b/meta/{path}.json")),
            data_size: size,
            meta_size: 10,
            stored_at: ts("2020-01-01T00:00:00Z"),
            updated_at: ts(updated),
        }
    }

    fn uref() -> UniversalReference {
        UniversalReference::new(ContentFingerprint::from_bytes(b"x", FingerprintFormat::CidV1).unwrap())
    }

    #[test]
    fn add_sighting_idempotent() {
        let mut u = uref();
        let s = sighting("a.jpg", "2021-01-01T00:00:00Z");
        assert!(u.add_sighting(&s));
        assert!(!u.add_sighting(&s));
        assert_eq!(u.srcs.len(), 1);
    }

    #[test]
    fn add_sighting_overwrites_modified_at() {
        let mut u = uref();
        assert!(u.add_sighting(&sighting("a.jpg", "2021-01-01T00:00:00Z")));
        assert!(u.add_sighting(&sighting("a.jpg", "2022-01-01T00:00:00Z")));
        assert_eq!(u.srcs.len(), 1);
        assert_eq!(u.srcs[0].modified_at, ts("2022-01-01T00:00:00Z"));
    }

    #[test]
    fn distinct_locations_in_same_source_are_kept() {
        let mut u = uref();
        assert!(u.add_sighting(&sighting("a.jpg", "2021-01-01T00:00:00Z")));
        assert!(u.add_sighting(&sighting("copy of a.jpg", "2021-01-01T00:00:00Z")));
        assert_eq!(u.srcs.len(), 2);
    }

    #[test]
    fn add_placement_updates_mutable_fields_only() {
        let mut u = uref();
        assert!(u.add_placement(&placement("a", 100, "2021-01-01T00:00:00Z")));
        assert!(!u.add_placement(&placement("a", 100, "2021-01-01T00:00:00Z")));

        let mut later = placement("a", 120, "2022-01-01T00:00:00Z");
        later.stored_at = ts("2022-01-01T00:00:00Z");
        assert!(u.add_placement(&later));

        assert_eq!(u.dsts.len(), 1);
        let p = &u.dsts[0];
        assert_eq!(p.data_size, 120);
        assert_eq!(p.updated_at, ts("2022-01-01T00:00:00Z"));
        assert_eq!(p.stored_at, ts("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn add_placement_fills_missing_stored_at() {
        let mut u = uref();
        let mut first = placement("a", 100, "2021-01-01T00:00:00Z");
        first.stored_at = None;
        assert!(u.add_placement(&first));
        assert!(u.add_placement(&placement("a", 100, "2021-01-01T00:00:00Z")));
        assert_eq!(u.dsts[0].stored_at, ts("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn decompose_is_cartesian_product() {
        let mut u = uref();
        for name in ["a", "b", "c"] {
            u.add_sighting(&sighting(name, "2021-01-01T00:00:00Z"));
        }
        for name in ["x", "y"] {
            u.add_placement(&placement(name, 1, "2021-01-01T00:00:00Z"));
        }
        let refs: Vec<Reference> = u.decompose().collect();
        assert_eq!(refs.len(), 6);
        for s in &u.srcs {
            for d in &u.dsts {
                assert_eq!(refs.iter().filter(|r| &r.src == s && &r.dst == d).count(), 1);
            }
        }
        // Fresh sequence each call.
        assert_eq!(u.decompose().count(), 6);
    }

    #[test]
    fn decompose_needs_both_sides() {
        let mut u = uref();
        u.add_sighting(&sighting("a", "2021-01-01T00:00:00Z"));
        assert_eq!(u.decompose().count(), 0);

        let mut v = uref();
        v.add_placement(&placement("a", 1, "2021-01-01T00:00:00Z"));
        assert_eq!(v.decompose().count(), 0);
    }

    #[test]
    fn empty_sides_are_omitted() {
        let json = serde_json::to_value(uref()).unwrap();
        assert!(json.get("srcs").is_none());
        assert!(json.get("dsts").is_none());
        let back: UniversalReference = serde_json::from_value(json).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn missing_timestamps_are_null() {
        let mut s = sighting("a", "2021-01-01T00:00:00Z");
        s.modified_at = None;
        let json = serde_json::to_value(&s).unwrap();
        assert!(json["modified_at"].is_null());
    }
}
