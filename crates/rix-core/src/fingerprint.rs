//! # Content Fingerprint — Content-Addressed Identity
//!
//! Defines [`ContentFingerprint`] and [`FingerprintFormat`]. A fingerprint is
//! computed from content bytes, so the same content found in different places
//! is recognised as one logical entity.
//!
//! ## Encodings
//!
//! Three encodings have been written over the life of the archive:
//!
//! | format        | text form                                   | example prefix |
//! |---------------|---------------------------------------------|----------------|
//! | `LegacySha1`  | 40 lowercase hex characters                 | `b8dfb0…`      |
//! | `MultihashV0` | base58btc of a SHA-1 multihash              | `5dtMo8…`      |
//! | `CidV1`       | CIDv1, `raw` codec, base32-lower multibase  | `bafkrc…`      |
//!
//! All three digest with SHA-1, so the same bytes produce the same digest
//! whatever format is selected.
//!
//! ## Equality
//!
//! - [`ContentFingerprint::equals`] (and `PartialEq`) is *identity*: the full
//!   encoded text matches.
//! - [`ContentFingerprint::hash_equals`] is *hash-equality*: the underlying
//!   digest bytes match regardless of encoding. Anything that unifies
//!   fingerprints (the reference index merge) must use this one.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use cid::multihash::Multihash;
use cid::{Cid, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::error::FingerprintError;

/// Length of the legacy hex digest text.
pub const LEGACY_HEX_LEN: usize = 40;

/// Multicodec code of SHA-1 inside a multihash.
const SHA1_CODE: u64 = 0x11;

/// Multicodec code of the identity "hash".
#[cfg(any(test, feature = "test-support"))]
const IDENTITY_CODE: u64 = 0x00;

/// Multicodec code of the `raw` content codec.
const RAW_CODEC: u64 = 0x55;

const SHA1_LEN: usize = 20;

const READ_CHUNK: usize = 64 * 1024;

/// The encoding a fingerprint is produced in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerprintFormat {
    /// Fixed-length hex SHA-1 digest.
    #[serde(rename = "legacy")]
    LegacySha1,
    /// Version 0 of the self-describing encoding: a base58btc multihash.
    #[serde(rename = "v0")]
    MultihashV0,
    /// Version 1 of the self-describing encoding: a CIDv1 with codec tag.
    #[default]
    #[serde(rename = "v1")]
    CidV1,
}

impl FingerprintFormat {
    /// Returns the short name used in configuration and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegacySha1 => "legacy",
            Self::MultihashV0 => "v0",
            Self::CidV1 => "v1",
        }
    }
}

impl fmt::Display for FingerprintFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerprintFormat {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::LegacySha1),
            "v0" => Ok(Self::MultihashV0),
            "v1" => Ok(Self::CidV1),
            other => Err(FingerprintError::UnknownFormat(other.to_string())),
        }
    }
}

/// An immutable content fingerprint.
///
/// Constructed from bytes via [`ContentFingerprint::from_reader`] /
/// [`ContentFingerprint::from_bytes`], or from text via
/// [`ContentFingerprint::parse`]. Never mutated after construction.
#[derive(Debug, Clone)]
pub enum ContentFingerprint {
    /// Raw SHA-1 digest rendered as fixed-length hex.
    LegacyHash([u8; SHA1_LEN]),
    /// Self-describing value: format tag plus multihash payload.
    SelfDescribing {
        /// Which self-describing version produced the text form.
        format: FingerprintFormat,
        /// Content codec; only meaningful for [`FingerprintFormat::CidV1`].
        codec: u64,
        /// Hash function code and digest bytes.
        multihash: Multihash<64>,
    },
}

impl ContentFingerprint {
    /// Fingerprint an entire byte stream in the requested format.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::Io` if the stream fails before EOF.
    pub fn from_reader<R: Read>(mut reader: R, format: FingerprintFormat) -> Result<Self, FingerprintError> {
        let mut hasher = Sha1::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let mut digest = [0u8; SHA1_LEN];
        digest.copy_from_slice(&hasher.finalize());
        Self::from_sha1(digest, format)
    }

    /// Fingerprint an in-memory byte slice.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if the digest cannot be wrapped in the
    /// requested self-describing encoding.
    pub fn from_bytes(data: &[u8], format: FingerprintFormat) -> Result<Self, FingerprintError> {
        let mut digest = [0u8; SHA1_LEN];
        digest.copy_from_slice(&Sha1::digest(data));
        Self::from_sha1(digest, format)
    }

    /// Fingerprint the file at `path`.
    pub fn from_path(path: impl AsRef<Path>, format: FingerprintFormat) -> Result<Self, FingerprintError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, format)
    }

    fn from_sha1(digest: [u8; SHA1_LEN], format: FingerprintFormat) -> Result<Self, FingerprintError> {
        match format {
            FingerprintFormat::LegacySha1 => Ok(Self::LegacyHash(digest)),
            FingerprintFormat::MultihashV0 | FingerprintFormat::CidV1 => {
                let multihash = wrap_multihash(SHA1_CODE, &digest, format)?;
                Ok(Self::SelfDescribing {
                    format,
                    codec: RAW_CODEC,
                    multihash,
                })
            }
        }
    }

    /// Parse a fingerprint from its text form, auto-detecting the format.
    ///
    /// Text of exactly [`LEGACY_HEX_LEN`] hex characters is a legacy digest.
    /// Anything else is decoded as a CID, falling back to a bare base58btc
    /// multihash. A SHA-1 CIDv1 is also 40 characters long, so length alone
    /// does not select the legacy form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLegacyHex` for bad legacy text and `Decode` when the
    /// text is not a self-describing value.
    pub fn parse(text: &str) -> Result<Self, FingerprintError> {
        if text.len() == LEGACY_HEX_LEN && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return decode_legacy_hex(text)
                .map(Self::LegacyHash)
                .ok_or_else(|| FingerprintError::InvalidLegacyHex(text.to_string()));
        }

        if let Ok(cid) = Cid::try_from(text) {
            let format = match cid.version() {
                Version::V0 => FingerprintFormat::MultihashV0,
                Version::V1 => FingerprintFormat::CidV1,
            };
            return Ok(Self::SelfDescribing {
                format,
                codec: cid.codec(),
                multihash: *cid.hash(),
            });
        }

        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| FingerprintError::Decode {
                value: text.to_string(),
                reason: e.to_string(),
            })?;
        let multihash = Multihash::<64>::from_bytes(&bytes).map_err(|e| FingerprintError::Decode {
            value: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::SelfDescribing {
            format: FingerprintFormat::MultihashV0,
            codec: RAW_CODEC,
            multihash,
        })
    }

    /// Wrap short literal text as a fingerprint without decoding it.
    ///
    /// Only for fixtures: the text is carried in an identity multihash and
    /// rendered as a CIDv1. Text of legacy length or longer must go through
    /// [`ContentFingerprint::parse`].
    #[cfg(any(test, feature = "test-support"))]
    pub fn literal(text: &str) -> Result<Self, FingerprintError> {
        if text.len() >= LEGACY_HEX_LEN {
            return Err(FingerprintError::LiteralTooLong(text.to_string()));
        }
        let multihash = wrap_multihash(IDENTITY_CODE, text.as_bytes(), FingerprintFormat::CidV1)?;
        Ok(Self::SelfDescribing {
            format: FingerprintFormat::CidV1,
            codec: RAW_CODEC,
            multihash,
        })
    }

    /// The encoding this fingerprint is rendered in.
    pub fn format(&self) -> FingerprintFormat {
        match self {
            Self::LegacyHash(_) => FingerprintFormat::LegacySha1,
            Self::SelfDescribing { format, .. } => *format,
        }
    }

    /// The underlying digest bytes, independent of encoding.
    pub fn digest(&self) -> &[u8] {
        match self {
            Self::LegacyHash(bytes) => bytes,
            Self::SelfDescribing { multihash, .. } => multihash.digest(),
        }
    }

    /// Multicodec code of the hash function that produced the digest.
    pub fn hash_code(&self) -> u64 {
        match self {
            Self::LegacyHash(_) => SHA1_CODE,
            Self::SelfDescribing { multihash, .. } => multihash.code(),
        }
    }

    /// Re-encode the same digest in another format.
    ///
    /// # Errors
    ///
    /// The legacy format can only carry SHA-1 digests.
    pub fn to_format(&self, format: FingerprintFormat) -> Result<Self, FingerprintError> {
        if format == self.format() {
            return Ok(self.clone());
        }
        match format {
            FingerprintFormat::LegacySha1 => {
                if self.hash_code() != SHA1_CODE || self.digest().len() != SHA1_LEN {
                    return Err(FingerprintError::UnsupportedFormat {
                        format: format.to_string(),
                        reason: format!("hash code {:#x} is not SHA-1", self.hash_code()),
                    });
                }
                let mut digest = [0u8; SHA1_LEN];
                digest.copy_from_slice(self.digest());
                Ok(Self::LegacyHash(digest))
            }
            FingerprintFormat::MultihashV0 | FingerprintFormat::CidV1 => {
                let multihash = wrap_multihash(self.hash_code(), self.digest(), format)?;
                let codec = match self {
                    Self::SelfDescribing { codec, .. } => *codec,
                    Self::LegacyHash(_) => RAW_CODEC,
                };
                Ok(Self::SelfDescribing {
                    format,
                    codec,
                    multihash,
                })
            }
        }
    }

    /// Identity equality: the full encoded text forms are identical.
    pub fn equals(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }

    /// Hash-equality: the digest bytes are identical, whatever the encoding.
    pub fn hash_equals(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }

    /// Render the digest bytes as lowercase hex.
    pub fn digest_hex(&self) -> String {
        self.digest().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyHash(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::SelfDescribing {
                format: FingerprintFormat::CidV1,
                codec,
                multihash,
            } => write!(f, "{}", Cid::new_v1(*codec, *multihash)),
            Self::SelfDescribing { multihash, .. } => {
                f.write_str(&bs58::encode(multihash.to_bytes()).into_string())
            }
        }
    }
}

impl PartialEq for ContentFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for ContentFingerprint {}

impl std::hash::Hash for ContentFingerprint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl FromStr for ContentFingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentFingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn wrap_multihash(code: u64, digest: &[u8], format: FingerprintFormat) -> Result<Multihash<64>, FingerprintError> {
    Multihash::<64>::wrap(code, digest).map_err(|e| FingerprintError::UnsupportedFormat {
        format: format.to_string(),
        reason: e.to_string(),
    })
}

fn decode_legacy_hex(text: &str) -> Option<[u8; SHA1_LEN]> {
    let bytes = text.as_bytes();
    let mut out = [0u8; SHA1_LEN];
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        *out.get_mut(i)? = (hi * 16 + lo) as u8;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTING_123: &[u8] = b"testing 123";
    const TESTING_123_LEGACY: &str = "b8dfb080bc33fb564249e34252bf143d88fc018f";
    const TESTING_123_V0: &str = "5dtMo8wsygWdXt5B5e5rvFfwK5LQLE";
    const TESTING_123_V1: &str = "bafkrcffy36yibpbt7nleespdijjl6fb5rd6addy";

    #[test]
    fn legacy_known_vector() {
        let fp = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::LegacySha1).unwrap();
        assert_eq!(fp.to_string(), TESTING_123_LEGACY);
        assert_eq!(fp.format(), FingerprintFormat::LegacySha1);
    }

    #[test]
    fn self_describing_known_vectors() {
        let v0 = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::MultihashV0).unwrap();
        let v1 = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::CidV1).unwrap();
        assert_eq!(v0.to_string(), TESTING_123_V0);
        assert_eq!(v1.to_string(), TESTING_123_V1);
    }

    #[test]
    fn v1_hash_equals_legacy_but_not_identical() {
        let legacy = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::LegacySha1).unwrap();
        let v1 = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::CidV1).unwrap();
        assert!(v1.hash_equals(&legacy));
        assert!(legacy.hash_equals(&v1));
        assert!(!v1.equals(&legacy));
        assert_ne!(v1, legacy);
    }

    #[test]
    fn reader_matches_slice() {
        let from_reader =
            ContentFingerprint::from_reader(std::io::Cursor::new(TESTING_123), FingerprintFormat::CidV1).unwrap();
        let from_slice = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::CidV1).unwrap();
        assert_eq!(from_reader, from_slice);
    }

    #[test]
    fn reader_failure_is_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        let err = ContentFingerprint::from_reader(Broken, FingerprintFormat::LegacySha1).unwrap_err();
        assert!(matches!(err, FingerprintError::Io(_)));
    }

    #[test]
    fn parse_detects_each_format() {
        assert_eq!(
            ContentFingerprint::parse(TESTING_123_LEGACY).unwrap().format(),
            FingerprintFormat::LegacySha1
        );
        assert_eq!(
            ContentFingerprint::parse(TESTING_123_V0).unwrap().format(),
            FingerprintFormat::MultihashV0
        );
        assert_eq!(
            ContentFingerprint::parse(TESTING_123_V1).unwrap().format(),
            FingerprintFormat::CidV1
        );
    }

    #[test]
    fn parse_round_trips_text() {
        for text in [TESTING_123_LEGACY, TESTING_123_V0, TESTING_123_V1] {
            let fp = ContentFingerprint::parse(text).unwrap();
            assert_eq!(fp.to_string(), text);
            assert_eq!(ContentFingerprint::parse(&fp.to_string()).unwrap(), fp);
        }
    }

    #[test]
    fn parse_rejects_non_hex_of_legacy_length() {
        let bad = "z".repeat(LEGACY_HEX_LEN);
        assert!(matches!(
            ContentFingerprint::parse(&bad),
            Err(FingerprintError::Decode { .. })
        ));
    }

    #[test]
    fn cid_v1_of_legacy_length_is_not_legacy() {
        assert_eq!(TESTING_123_V1.len(), LEGACY_HEX_LEN);

        let fp = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::CidV1).unwrap();
        assert_eq!(fp.to_string(), TESTING_123_V1);
        let parsed = ContentFingerprint::parse(TESTING_123_V1).unwrap();
        assert_eq!(parsed.format(), FingerprintFormat::CidV1);
        assert!(parsed.equals(&fp));

        let json = serde_json::to_string(&fp).unwrap();
        let back: ContentFingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert_eq!(back.format(), FingerprintFormat::CidV1);
    }

    #[test]
    fn from_bytes_yields_requested_format() {
        for format in [
            FingerprintFormat::LegacySha1,
            FingerprintFormat::MultihashV0,
            FingerprintFormat::CidV1,
        ] {
            let fp = ContentFingerprint::from_bytes(TESTING_123, format).unwrap();
            assert_eq!(fp.format(), format);
            assert_eq!(fp.digest_hex(), TESTING_123_LEGACY);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            ContentFingerprint::parse("not a fingerprint!"),
            Err(FingerprintError::Decode { .. })
        ));
        assert!(ContentFingerprint::parse("").is_err());
    }

    #[test]
    fn parse_real_cid_v0() {
        // A sha2-256 CIDv0 as written by other IPFS tooling.
        let text = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
        let fp = ContentFingerprint::parse(text).unwrap();
        assert_eq!(fp.format(), FingerprintFormat::MultihashV0);
        assert_eq!(fp.hash_code(), 0x12);
        assert_eq!(fp.to_string(), text);
    }

    #[test]
    fn to_format_preserves_digest() {
        let v0 = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::MultihashV0).unwrap();
        let legacy = v0.to_format(FingerprintFormat::LegacySha1).unwrap();
        assert_eq!(legacy.to_string(), TESTING_123_LEGACY);
        let v1 = legacy.to_format(FingerprintFormat::CidV1).unwrap();
        assert_eq!(v1.to_string(), TESTING_123_V1);
    }

    #[test]
    fn to_legacy_rejects_non_sha1() {
        let fp = ContentFingerprint::parse("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap();
        assert!(matches!(
            fp.to_format(FingerprintFormat::LegacySha1),
            Err(FingerprintError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn different_inputs_not_hash_equal() {
        let a = ContentFingerprint::from_bytes(b"a", FingerprintFormat::CidV1).unwrap();
        let b = ContentFingerprint::from_bytes(b"b", FingerprintFormat::CidV1).unwrap();
        assert!(!a.hash_equals(&b));
    }

    #[test]
    fn literal_round_trips_and_is_length_checked() {
        let fp = ContentFingerprint::literal("abc").unwrap();
        assert_eq!(ContentFingerprint::parse(&fp.to_string()).unwrap(), fp);
        assert_eq!(fp.digest(), b"abc");

        let long = "a".repeat(LEGACY_HEX_LEN);
        assert!(matches!(
            ContentFingerprint::literal(&long),
            Err(FingerprintError::LiteralTooLong(_))
        ));
    }

    #[test]
    fn serde_uses_text_form() {
        let fp = ContentFingerprint::from_bytes(TESTING_123, FingerprintFormat::CidV1).unwrap();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{TESTING_123_V1}\""));
        let back: ContentFingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert!(serde_json::from_str::<ContentFingerprint>("\"!!\"").is_err());
    }

    #[test]
    fn format_names() {
        for format in [
            FingerprintFormat::LegacySha1,
            FingerprintFormat::MultihashV0,
            FingerprintFormat::CidV1,
        ] {
            assert_eq!(format.as_str().parse::<FingerprintFormat>().unwrap(), format);
        }
        assert!("sha256".parse::<FingerprintFormat>().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_format() -> impl Strategy<Value = FingerprintFormat> {
        prop_oneof![
            Just(FingerprintFormat::LegacySha1),
            Just(FingerprintFormat::MultihashV0),
            Just(FingerprintFormat::CidV1),
        ]
    }

    proptest! {
        /// Every format of the same bytes is hash-equal.
        #[test]
        fn formats_are_hash_equal(data in prop::collection::vec(any::<u8>(), 0..512), f1 in any_format(), f2 in any_format()) {
            let a = ContentFingerprint::from_bytes(&data, f1).unwrap();
            let b = ContentFingerprint::from_bytes(&data, f2).unwrap();
            prop_assert!(a.hash_equals(&b));
            prop_assert_eq!(a.equals(&b), f1 == f2);
        }

        /// Text form always parses back to an identical fingerprint.
        #[test]
        fn text_round_trip(data in prop::collection::vec(any::<u8>(), 0..512), f in any_format()) {
            let fp = ContentFingerprint::from_bytes(&data, f).unwrap();
            let parsed = ContentFingerprint::parse(&fp.to_string()).unwrap();
            prop_assert!(parsed.equals(&fp));
            prop_assert_eq!(parsed.format(), f);
        }

        /// Distinct inputs never collide.
        #[test]
        fn distinct_inputs_differ(a in prop::collection::vec(any::<u8>(), 0..64), b in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(a != b);
            let fa = ContentFingerprint::from_bytes(&a, FingerprintFormat::CidV1).unwrap();
            let fb = ContentFingerprint::from_bytes(&b, FingerprintFormat::LegacySha1).unwrap();
            prop_assert!(!fa.hash_equals(&fb));
        }
    }
}
