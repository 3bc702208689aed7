//! Fixed-length opaque byte values.
//!
//! Hashes, device identifiers and signatures are never interpreted by the
//! ledger. Their only invariant is length, enforced at construction.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} bytes, got {actual}")]
pub struct LengthMismatch {
    pub expected: usize,
    pub actual: usize,
}

fn exact<const N: usize>(bytes: &[u8]) -> Result<[u8; N], LengthMismatch> {
    <[u8; N]>::try_from(bytes).map_err(|_| LengthMismatch {
        expected: N,
        actual: bytes.len(),
    })
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// 32-byte content hash (notes, location, confirmation, progress notes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Digest32([u8; 32]);

impl Digest32 {
    pub const LEN: usize = 32;

    #[must_use]
    pub const fn from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Byte equality against an arbitrary-length candidate.
    ///
    /// A candidate of the wrong length is simply unequal.
    #[must_use]
    pub fn matches(&self, candidate: &[u8]) -> bool {
        self.0.as_slice() == candidate
    }
}

impl TryFrom<&[u8]> for Digest32 {
    type Error = LengthMismatch;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        exact(bytes).map(Self)
    }
}

impl TryFrom<Vec<u8>> for Digest32 {
    type Error = LengthMismatch;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<Digest32> for Vec<u8> {
    fn from(value: Digest32) -> Self {
        value.0.to_vec()
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Digest32(")?;
        write_hex(f, &self.0)?;
        f.write_str(")")
    }
}

/// 32-byte opaque device identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DeviceId([u8; 32]);

impl DeviceId {
    pub const LEN: usize = 32;

    #[must_use]
    pub const fn from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<&[u8]> for DeviceId {
    type Error = LengthMismatch;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        exact(bytes).map(Self)
    }
}

impl TryFrom<Vec<u8>> for DeviceId {
    type Error = LengthMismatch;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<DeviceId> for Vec<u8> {
    fn from(value: DeviceId) -> Self {
        value.0.to_vec()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceId(")?;
        write_hex(f, &self.0)?;
        f.write_str(")")
    }
}

/// 65-byte authorization blob.
///
/// Stored boxed: serde has no array impls past 32 elements and the value
/// is only ever compared or echoed back.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Signature(Box<[u8; 65]>);

impl Signature {
    pub const LEN: usize = 65;

    #[must_use]
    pub fn from_array(bytes: [u8; 65]) -> Self {
        Self(Box::new(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = LengthMismatch;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        exact(bytes).map(Self::from_array)
    }
}

impl TryFrom<Vec<u8>> for Signature {
    type Error = LengthMismatch;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<Signature> for Vec<u8> {
    fn from(value: Signature) -> Self {
        value.0.to_vec()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signature(")?;
        write_hex(f, &self.0[..4])?;
        f.write_str("..)")
    }
}
