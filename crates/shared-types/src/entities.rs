//! # Core Primitive Entities
//!
//! Hashes, timestamps and addresses used across the ledger, plus the hex
//! serde adapters that keep every hash human-readable on the wire.

use crate::errors::HashParseError;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Account identifier. Ledger addresses are opaque strings (DIDs, wallet ids).
pub type Address = String;

/// The all-zero hash. Used as the genesis parent sentinel.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Render a hash as lowercase hex.
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Short hex prefix (8 bytes) for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

/// Parse a 64-character hex string into a [`Hash`].
pub fn parse_hash(input: &str) -> Result<Hash, HashParseError> {
    let bytes = hex::decode(input).map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(HashParseError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut hash = ZERO_HASH;
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// Serde adapter: `Hash` as a hex string.
pub mod hex_hash {
    use super::{parse_hash, Hash};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hash(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Option<Hash>` as an optional hex string.
pub mod hex_hash_opt {
    use super::{parse_hash, Hash};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Option<Hash>, serializer: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(h) => serializer.serialize_some(&hex::encode(h)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Hash>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse_hash(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
