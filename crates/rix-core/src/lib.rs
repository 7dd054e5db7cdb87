//! # rix-core — Foundational Types for the Reference Index
//!
//! This crate is the leaf of the rix workspace. It defines the value types
//! every other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Content identity, not names.** A [`ContentFingerprint`] is computed
//!    from bytes. Several historical encodings exist; they share one
//!    identity contract via [`ContentFingerprint::hash_equals`].
//!
//! 2. **Derived endpoint identities.** [`SourceId`] and [`DestinationId`] are
//!    name-based UUIDs computed from endpoint locations. Registering the
//!    same endpoint twice always yields the same identifier, with no
//!    registry involved.
//!
//! 3. **Validated newtypes.** [`Location`] and [`Timestamp`] are validated at
//!    construction; there is no "invalid but present" state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rix-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod fingerprint;
pub mod identity;
pub mod location;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::{FingerprintError, LocationError, ParseError, RixError};
pub use fingerprint::{ContentFingerprint, FingerprintFormat, LEGACY_HEX_LEN};
pub use identity::{derive_destination_id, derive_source_id, DestinationId, SourceId};
pub use location::Location;
pub use temporal::Timestamp;
