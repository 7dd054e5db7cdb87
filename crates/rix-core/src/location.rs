//! # Locations
//!
//! [`Location`] is the URI type used for every endpoint and every place
//! content was found or stored. It wraps `url::Url`, so only absolute URIs
//! are accepted and the string form is normalised on parse.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::LocationError;

/// An absolute, normalised URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(Url);

impl Location {
    /// Parse an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns `LocationError::Invalid` for relative or malformed input.
    pub fn parse(value: &str) -> Result<Self, LocationError> {
        Url::parse(value).map(Self).map_err(|e| LocationError::Invalid {
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Build a `file://` location from an absolute filesystem path.
    pub fn from_file_path(path: impl AsRef<Path>) -> Result<Self, LocationError> {
        let path = path.as_ref();
        Url::from_file_path(path).map(Self).map_err(|()| LocationError::Invalid {
            value: path.display().to_string(),
            reason: "not an absolute path".to_string(),
        })
    }

    /// Build a `file://` location for a directory, ending in `/` so that
    /// [`Location::join`] resolves beneath it.
    pub fn from_directory_path(path: impl AsRef<Path>) -> Result<Self, LocationError> {
        let path = path.as_ref();
        Url::from_directory_path(path).map(Self).map_err(|()| LocationError::Invalid {
            value: path.display().to_string(),
            reason: "not an absolute path".to_string(),
        })
    }

    /// Resolve a relative reference against this location.
    pub fn join(&self, reference: &str) -> Result<Self, LocationError> {
        self.0.join(reference).map(Self).map_err(|e| LocationError::Invalid {
            value: reference.to_string(),
            reason: e.to_string(),
        })
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Access the underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl std::str::FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
