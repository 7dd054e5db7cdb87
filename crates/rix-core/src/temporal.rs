//! # Temporal Types
//!
//! UTC-only timestamp type for sightings and placements. Timestamps are
//! serialised as RFC 3339 with a `Z` suffix; sub-second digits are kept
//! only when present, so filesystem modification times survive a round
//! trip exactly.
//!
//! ## Absent Timestamps
//!
//! Optional timestamps are written as `null`. Older writers emitted a
//! "zero" time instead of `null`; on read, both the Unix epoch and
//! `0001-01-01T00:00:00Z` are decoded as absent. See [`optional`].

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RixError;

/// A UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Create a timestamp from a Unix epoch value in seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, RixError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| RixError::Precondition(format!("timestamp out of range: {secs}")))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, RixError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| RixError::Precondition(format!("invalid RFC 3339 timestamp {s:?}: {e}")))
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whether this is a "zero" value written by older tooling.
    pub fn is_zero(&self) -> bool {
        let secs = self.0.timestamp();
        secs == 0 || self.0 == zero_time()
    }

    /// RFC 3339 text with `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

fn zero_time() -> DateTime<Utc> {
    // 0001-01-01T00:00:00Z
    DateTime::from_timestamp(-62_135_596_800, 0).unwrap_or_default()
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        Self(DateTime::<Utc>::from(t))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Timestamp>` fields.
///
/// Use with `#[serde(with = "rix_core::temporal::optional", default)]`.
pub mod optional {
    use super::*;

    /// Write `None` (and zero values) as `null`.
    pub fn serialize<S: Serializer>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) if !ts.is_zero() => ts.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }

    /// Read `null`, a missing field, or a zero time as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
        let value = Option::<Timestamp>::deserialize(deserializer)?;
        Ok(value.filter(|ts| !ts.is_zero()))
    }
}
