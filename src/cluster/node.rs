use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a storage daemon (`host:port`).
///
/// Ordering is lexicographic on the address string; rendezvous ranking uses
/// it to break score ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddr(String);

impl NodeAddr {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Binary form used for hashing: the raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn bin_size(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for NodeAddr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeAddr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a stored record.
///
/// The binary encoding is 4 bytes little-endian taken from the low 32 bits of
/// the value. Keys that are equal modulo 2^32 encode, and therefore route,
/// identically. Record keys are 32-bit in practice; the wider carrier type
/// only exists so callers can pass `u64` ids without casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub const BIN_SIZE: usize = 4;

    pub fn to_bytes(self) -> [u8; Self::BIN_SIZE] {
        (self.0 as u32).to_le_bytes()
    }
}

impl From<u64> for RecordId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<u32> for RecordId {
    fn from(v: u32) -> Self {
        Self(u64::from(v))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
