//! # Reference Index
//!
//! The aggregate of known sources, destinations and per-fingerprint
//! universal references. Mutated only through the operations below; each
//! operation either applies completely or not at all, and none performs
//! I/O.
//!
//! Lookups are linear scans. The index is a value type documenting merge
//! semantics; callers that need scale keep their own lookup tables keyed
//! by ID or fingerprint.

use serde::{Deserialize, Serialize};

use rix_core::{ContentFingerprint, DestinationId, RixError, SourceId};

use crate::endpoint::{Destination, Source};
use crate::migration::CURRENT_VERSION;
use crate::reference::{Reference, UniversalReference};

/// The persisted reference index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIndex {
    version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    srcs: Vec<Source>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dsts: Vec<Destination>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    refs: Vec<UniversalReference>,
}

/// Summary counts over an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Registered sources.
    pub sources: usize,
    /// Registered destinations.
    pub destinations: usize,
    /// Distinct fingerprints.
    pub fingerprints: usize,
    /// Sightings across all fingerprints.
    pub sightings: usize,
    /// Placements across all fingerprints.
    pub placements: usize,
}

impl Default for ReferenceIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceIndex {
    /// An empty index stamped with the current schema version.
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            srcs: Vec::new(),
            dsts: Vec::new(),
            refs: Vec::new(),
        }
    }

    /// Schema version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Registered sources, in insertion order.
    pub fn sources(&self) -> &[Source] {
        &self.srcs
    }

    /// Registered destinations, in insertion order.
    pub fn destinations(&self) -> &[Destination] {
        &self.dsts
    }

    /// Universal references, in insertion order.
    pub fn universal_references(&self) -> &[UniversalReference] {
        &self.refs
    }

    /// Register a source. Returns `false` if one with the same ID exists.
    pub fn add_source(&mut self, src: Source) -> bool {
        if self.get_source(&src.src_id).is_some() {
            return false;
        }
        tracing::trace!(src_id = %src.src_id, src_uri = %src.src_uri, "source added");
        self.srcs.push(src);
        true
    }

    /// Register a destination. Returns `false` if one with the same ID exists.
    pub fn add_destination(&mut self, dst: Destination) -> bool {
        if self.get_destination(&dst.dst_id).is_some() {
            return false;
        }
        tracing::trace!(dst_id = %dst.dst_id, index_uri = %dst.index_uri, "destination added");
        self.dsts.push(dst);
        true
    }

    /// Look up a source by ID.
    pub fn get_source(&self, id: &SourceId) -> Option<&Source> {
        self.srcs.iter().find(|s| &s.src_id == id)
    }

    /// Look up a destination by ID.
    pub fn get_destination(&self, id: &DestinationId) -> Option<&Destination> {
        self.dsts.iter().find(|d| &d.dst_id == id)
    }

    /// Fold one observation into the index.
    ///
    /// The observation joins the universal reference whose fingerprint is
    /// hash-equal to `reference.hash`, created if absent. Returns whether
    /// either the sighting or the placement changed anything; repeating an
    /// identical observation returns `false`.
    pub fn add_reference(&mut self, reference: &Reference) -> bool {
        let slot = match self.refs.iter().position(|u| u.hash.hash_equals(&reference.hash)) {
            Some(pos) => pos,
            None => {
                self.refs.push(UniversalReference::new(reference.hash.clone()));
                self.refs.len() - 1
            }
        };
        let uref = &mut self.refs[slot];
        let src_changed = uref.add_sighting(&reference.src);
        let dst_changed = uref.add_placement(&reference.dst);
        tracing::trace!(hash = %reference.hash, src_changed, dst_changed, "reference merged");
        src_changed || dst_changed
    }

    /// Look up the universal reference for a fingerprint, in any encoding.
    pub fn get_reference(&self, hash: &ContentFingerprint) -> Option<&UniversalReference> {
        self.refs.iter().find(|u| u.hash.hash_equals(hash))
    }

    /// Every decomposed reference, universal reference by universal reference.
    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        self.refs.iter().flat_map(|u| u.decompose())
    }

    /// Remove a source and every sighting recorded against it.
    ///
    /// Universal references left with neither sightings nor placements are
    /// dropped. Returns whether anything changed.
    pub fn remove_source(&mut self, id: &SourceId) -> bool {
        let before = self.srcs.len();
        self.srcs.retain(|s| &s.src_id != id);
        let mut changed = self.srcs.len() != before;
        for uref in &mut self.refs {
            let n = uref.srcs.len();
            uref.srcs.retain(|s| &s.src_id != id);
            changed |= uref.srcs.len() != n;
        }
        self.prune_empty();
        changed
    }

    /// Remove a destination and every placement recorded against it.
    ///
    /// Universal references left with neither sightings nor placements are
    /// dropped. Returns whether anything changed.
    pub fn remove_destination(&mut self, id: &DestinationId) -> bool {
        let before = self.dsts.len();
        self.dsts.retain(|d| &d.dst_id != id);
        let mut changed = self.dsts.len() != before;
        for uref in &mut self.refs {
            let n = uref.dsts.len();
            uref.dsts.retain(|d| &d.dst_id != id);
            changed |= uref.dsts.len() != n;
        }
        self.prune_empty();
        changed
    }

    fn prune_empty(&mut self) {
        self.refs.retain(|u| !u.is_empty());
    }

    /// Summary counts.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            sources: self.srcs.len(),
            destinations: self.dsts.len(),
            fingerprints: self.refs.len(),
            sightings: self.refs.iter().map(|u| u.srcs.len()).sum(),
            placements: self.refs.iter().map(|u| u.dsts.len()).sum(),
        }
    }

    /// Pretty JSON in the persisted document shape.
    ///
    /// Output is deterministic: equal indexes serialise to equal bytes.
    pub fn to_json(&self) -> Result<String, RixError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
