//! Content hashing for emitted artifacts and structural fingerprints for
//! incremental regeneration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Used to compare emitted source text: two artifacts with the same
/// `ContentHash` are assumed to have identical text, so a host build can
/// skip rewriting them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// A 256-bit SHA-256 digest over the structural content of a model.
///
/// Fingerprints are built field by field through [`FingerprintBuilder`] so
/// that two models with the same structure always produce the same digest,
/// independent of the order in which they were discovered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fingerprint({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Incremental SHA-256 writer with an unambiguous field encoding.
///
/// Every field is written with a one-byte tag and, for variable-length data,
/// a little-endian length prefix. `("ab", "c")` and `("a", "bc")` therefore
/// never collide, and neither do an absent value and an empty string.
pub struct FingerprintBuilder {
    hasher: Sha256,
}

const TAG_STR: u8 = 0x01;
const TAG_U64: u8 = 0x02;
const TAG_BOOL: u8 = 0x03;
const TAG_NONE: u8 = 0x04;
const TAG_SOME: u8 = 0x05;
const TAG_SEQ: u8 = 0x06;
const TAG_DIGEST: u8 = 0x07;

impl FingerprintBuilder {
    /// Starts a new fingerprint under the given domain label.
    ///
    /// The label separates fingerprints of different model kinds.
    pub fn new(domain: &str) -> Self {
        let mut builder = Self {
            hasher: Sha256::new(),
        };
        builder.str(domain);
        builder
    }

    /// Writes a string field.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.hasher.update([TAG_STR]);
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Writes an unsigned integer field.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update([TAG_U64]);
        self.hasher.update(value.to_le_bytes());
        self
    }

    /// Writes a boolean field.
    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.hasher.update([TAG_BOOL, u8::from(value)]);
        self
    }

    /// Writes an optional string field.
    pub fn opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => {
                self.hasher.update([TAG_SOME]);
                self.str(v)
            }
            None => {
                self.hasher.update([TAG_NONE]);
                self
            }
        }
    }

    /// Marks the start of a sequence of `len` elements.
    pub fn seq(&mut self, len: usize) -> &mut Self {
        self.hasher.update([TAG_SEQ]);
        self.hasher.update((len as u64).to_le_bytes());
        self
    }

    /// Folds a previously computed fingerprint into this one.
    pub fn fingerprint(&mut self, value: &Fingerprint) -> &mut Self {
        self.hasher.update([TAG_DIGEST]);
        self.hasher.update(value.0);
        self
    }

    /// Consumes the builder and returns the digest.
    pub fn finish(self) -> Fingerprint {
        let digest = self.hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Fingerprint(out)
    }
}
