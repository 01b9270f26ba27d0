use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Width of a raw object identifier in bytes.
pub const ID_LEN: usize = 20;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 hash of an object's framed content
/// (`<kind> <len>\0<payload>`). Identical content always produces the
/// same `ObjectId`, making objects deduplicatable and verifiable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    /// Compute an `ObjectId` by hashing raw bytes.
    pub fn hash_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create an `ObjectId` from a pre-computed 20-byte digest.
    pub const fn from_raw(raw: [u8; ID_LEN]) -> Self {
        Self(raw)
    }

    /// Create an `ObjectId` from a raw byte slice of exactly 20 bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, TypeError> {
        if raw.len() != ID_LEN {
            return Err(TypeError::InvalidLength {
                expected: ID_LEN,
                actual: raw.len(),
            });
        }
        let mut arr = [0u8; ID_LEN];
        arr.copy_from_slice(raw);
        Ok(Self(arr))
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// The two-character directory component of the fan-out path.
    pub fn fanout_dir(&self) -> String {
        self.to_hex()[..2].to_string()
    }

    /// The remaining 38-character filename component of the fan-out path.
    pub fn fanout_file(&self) -> String {
        self.to_hex()[2..].to_string()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; ID_LEN]> for ObjectId {
    fn from(raw: [u8; ID_LEN]) -> Self {
        Self(raw)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
