//! # Error Hierarchy
//!
//! Structured error types for the reference index, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! The four error kinds surfaced to callers are:
//!
//! - **Io**: a byte stream could not be fully read while fingerprinting.
//! - **Parse**: malformed fingerprint text or a malformed location.
//! - **UnsupportedVersion**: a persisted document carries a version tag the
//!   migrator does not recognise.
//! - **Precondition**: a constructor was called with input it cannot accept.
//!
//! None of these are retried or swallowed inside the library.

use thiserror::Error;

/// Top-level error type for the reference index.
#[derive(Error, Debug)]
pub enum RixError {
    /// Stream could not be fully read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed fingerprint or location text.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persisted document version is not recognised.
    #[error("unsupported document version {version:?}")]
    UnsupportedVersion {
        /// The tag found in the document.
        version: String,
    },

    /// A constructor precondition was violated.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// JSON encoding or decoding of a persisted document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse failures, grouped by the value being parsed.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Fingerprint text could not be decoded.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// Location text could not be parsed as a URI.
    #[error(transparent)]
    Location(#[from] LocationError),
}

impl From<FingerprintError> for RixError {
    fn from(err: FingerprintError) -> Self {
        match err {
            FingerprintError::Io(io) => Self::Io(io),
            FingerprintError::LiteralTooLong(text) => {
                Self::Precondition(format!("literal fingerprint \"{text}\" is too long; parse it instead"))
            }
            other => Self::Parse(ParseError::Fingerprint(other)),
        }
    }
}

impl From<LocationError> for RixError {
    fn from(err: LocationError) -> Self {
        Self::Parse(ParseError::Location(err))
    }
}

/// Errors while computing or decoding a content fingerprint.
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// The input stream failed before it was fully consumed.
    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),

    /// Text of legacy length was not valid lowercase hex.
    #[error("invalid legacy digest \"{0}\" (expected 40 hex characters)")]
    InvalidLegacyHex(String),

    /// Text was not a decodable self-describing value.
    #[error("cannot decode fingerprint \"{value}\": {reason}")]
    Decode {
        /// The text that failed to decode.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The digest cannot be represented in the requested format.
    #[error("fingerprint cannot be encoded as {format}: {reason}")]
    UnsupportedFormat {
        /// The requested format name.
        format: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The literal constructor was given text of legacy length or longer.
    #[error("literal fingerprint \"{0}\" is too long; parse it instead")]
    LiteralTooLong(String),

    /// Unknown format name.
    #[error("unknown fingerprint format \"{0}\" (expected legacy, v0 or v1)")]
    UnknownFormat(String),
}

/// Errors while parsing a location.
#[derive(Error, Debug)]
pub enum LocationError {
    /// The value is not an absolute URI.
    #[error("invalid location \"{value}\": {reason}")]
    Invalid {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
