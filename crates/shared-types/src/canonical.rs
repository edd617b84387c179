//! # Canonical Encoding
//!
//! Deterministic byte encodings for everything that gets hashed.
//!
//! Fixed-layout records (block headers, transactions) use [`CanonicalEncoder`]:
//! integers are little-endian, variable-length fields are length-prefixed and
//! optional fields carry a presence tag, so no two distinct field sequences
//! can collide. Free-form values use [`canonical_json`]; `serde_json` objects
//! are sorted maps, so key order never depends on insertion order.

use crate::entities::Hash;
use serde::Serialize;

/// Builder for the canonical byte layout of a record.
#[derive(Debug, Default, Clone)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(128),
        }
    }

    /// Append a `u64` (little-endian).
    pub fn u64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a 32-byte hash verbatim.
    pub fn hash(mut self, hash: &Hash) -> Self {
        self.buf.extend_from_slice(hash);
        self
    }

    /// Append an optional hash with a presence tag.
    pub fn opt_hash(mut self, hash: Option<&Hash>) -> Self {
        match hash {
            Some(h) => {
                self.buf.push(1);
                self.buf.extend_from_slice(h);
            }
            None => self.buf.push(0),
        }
        self
    }

    /// Append length-prefixed raw bytes.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn str(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    /// Append an optional string with a presence tag.
    pub fn opt_str(mut self, value: Option<&str>) -> Self {
        match value {
            Some(s) => {
                self.buf.push(1);
                self.str(s)
            }
            None => {
                self.buf.push(0);
                self
            }
        }
    }

    /// Append optional length-prefixed bytes with a presence tag.
    pub fn opt_bytes(mut self, value: Option<&[u8]>) -> Self {
        match value {
            Some(b) => {
                self.buf.push(1);
                self.bytes(b)
            }
            None => {
                self.buf.push(0);
                self
            }
        }
    }

    /// Append a JSON value in its compact, key-sorted textual form.
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.str(&value.to_string())
    }

    /// Finish and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Canonical JSON bytes for a serializable value.
///
/// Struct fields are emitted in declaration order and maps must be sorted
/// (`BTreeMap` or `serde_json::Map`), which makes the output deterministic.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}
