//! # rix-index — The Reference Index
//!
//! Tracks which pieces of content exist, where they were found (sources)
//! and where they were copied to (destinations).
//!
//! ## Model
//!
//! - [`Source`] / [`Destination`]: registered endpoints with derived IDs.
//! - [`SourceSighting`]: content seen at a place inside a Source.
//! - [`DestinationPlacement`]: content stored at a place inside a Destination.
//! - [`Reference`]: one fingerprint with one sighting and one placement.
//!   The unit of input to a merge; never persisted.
//! - [`UniversalReference`]: everything ever observed for one fingerprint.
//! - [`ReferenceIndex`]: the aggregate, persisted as one JSON document.
//!
//! ## Concurrency
//!
//! All types here are plain values with no internal locking. A caller that
//! shares an index between threads must guard the whole aggregate, e.g.
//! with a single writer or an `RwLock<ReferenceIndex>`.
//!
//! ## Persistence
//!
//! [`migration`] upgrades documents written by older schema versions before
//! they are decoded; [`store::IndexStore`] wraps load/migrate/save for a
//! file on disk.

pub mod endpoint;
pub mod index;
pub mod layout;
pub mod meta;
pub mod migration;
pub mod reference;
pub mod store;

pub use endpoint::{Destination, Source};
pub use index::{IndexStats, ReferenceIndex};
pub use layout::{Layout, ShardedLayout};
pub use meta::MetaDocument;
pub use migration::{MigrationError, MigrationOutcome, SchemaVersion, CURRENT_VERSION};
pub use reference::{DestinationPlacement, Reference, SourceSighting, UniversalReference};
pub use store::IndexStore;
