//! Fingerprint value type and Hamming distance.
//!
//! A [`Fingerprint`] is an immutable, byte-aligned bit vector. Logical bit
//! `i` lives in byte `i / 8` under mask `0x80 >> (i % 8)`, i.e. bit 0 is the
//! most significant bit of byte 0. The width in bits is always eight times
//! the byte length.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{validate_width, PerceptualError};

/// Fixed-width simhash fingerprint.
///
/// Equality and hashing compare the byte content, so fingerprints can be
/// used directly as (part of) set or map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Load a fingerprint from raw bytes. The width is `8 * bytes.len()`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, PerceptualError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(PerceptualError::EmptyFingerprint);
        }
        Ok(Self { bytes })
    }

    /// Load a fingerprint from raw bytes, checking them against an expected
    /// width.
    pub fn from_bytes_with_width(
        width_bits: usize,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Self, PerceptualError> {
        validate_width(width_bits)?;
        let bytes = bytes.into();
        if bytes.len() * 8 != width_bits {
            return Err(PerceptualError::SizeMismatch {
                left: width_bits,
                right: bytes.len() * 8,
            });
        }
        Ok(Self { bytes })
    }

    /// A 64-bit fingerprint holding `value` in big-endian order.
    pub fn from_u64(value: u64) -> Self {
        Self {
            bytes: value.to_be_bytes().to_vec(),
        }
    }

    /// Caller guarantees `bytes` is non-empty.
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty());
        Self { bytes }
    }

    /// Width of the fingerprint in bits.
    pub fn width_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Logical bit `i`, or `None` past the end.
    pub fn bit(&self, i: usize) -> Option<bool> {
        self.bytes
            .get(i / 8)
            .map(|byte| byte & (0x80 >> (i % 8)) != 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Hamming distance to `other`.
    ///
    /// Fails with [`PerceptualError::SizeMismatch`] when the widths differ.
    pub fn distance(&self, other: &Fingerprint) -> Result<u32, PerceptualError> {
        distance(self, other)
    }
}

/// Hamming distance between two fingerprints of equal width.
///
/// ```rust
/// use perceptual::{distance, Fingerprint};
///
/// let a = Fingerprint::from_u64(0b1011);
/// let b = Fingerprint::from_u64(0b0110);
/// assert_eq!(distance(&a, &b).unwrap(), 3);
/// ```
pub fn distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32, PerceptualError> {
    if a.bytes.len() != b.bytes.len() {
        return Err(PerceptualError::SizeMismatch {
            left: a.width_bits(),
            right: b.width_bits(),
        });
    }
    Ok(xor_popcount(&a.bytes, &b.bytes))
}

/// Popcount of `a ^ b`, eight bytes at a time. Slices must be equally long.
#[inline]
fn xor_popcount(a: &[u8], b: &[u8]) -> u32 {
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    let mut total = 0u32;

    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        let mut wa = [0u8; 8];
        let mut wb = [0u8; 8];
        wa.copy_from_slice(ca);
        wb.copy_from_slice(cb);
        total += (u64::from_ne_bytes(wa) ^ u64::from_ne_bytes(wb)).count_ones();
    }

    total
        + chunks_a
            .remainder()
            .iter()
            .zip(chunks_b.remainder())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum::<u32>()
}

impl TryFrom<Vec<u8>> for Fingerprint {
    type Error = PerceptualError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<Fingerprint> for Vec<u8> {
    fn from(fp: Fingerprint) -> Self {
        fp.bytes
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_sets_width() {
        let fp = Fingerprint::from_bytes(vec![0xAB, 0xCD]).unwrap();
        assert_eq!(fp.width_bits(), 16);
        assert_eq!(fp.as_bytes(), &[0xAB, 0xCD]);
    }

    #[test]
    fn from_bytes_rejects_empty() {
        assert_eq!(
            Fingerprint::from_bytes(Vec::new()),
            Err(PerceptualError::EmptyFingerprint)
        );
    }

    #[test]
    fn from_bytes_with_width_checks_length() {
        assert!(Fingerprint::from_bytes_with_width(16, vec![1, 2]).is_ok());
        assert_eq!(
            Fingerprint::from_bytes_with_width(64, vec![1, 2]),
            Err(PerceptualError::SizeMismatch {
                left: 64,
                right: 16
            })
        );
        assert_eq!(
            Fingerprint::from_bytes_with_width(12, vec![1, 2]),
            Err(PerceptualError::InvalidWidth { width_bits: 12 })
        );
    }

    #[test]
    fn bit_order_is_msb_first() {
        let fp = Fingerprint::from_bytes(vec![0b1000_0001, 0b0100_0000]).unwrap();
        assert_eq!(fp.bit(0), Some(true));
        assert_eq!(fp.bit(1), Some(false));
        assert_eq!(fp.bit(7), Some(true));
        assert_eq!(fp.bit(9), Some(true));
        assert_eq!(fp.bit(16), None);
    }

    #[test]
    fn from_u64_is_big_endian() {
        let fp = Fingerprint::from_u64(0x0102_0304_0506_0708);
        assert_eq!(fp.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(fp.width_bits(), 64);
    }

    #[test]
    fn distance_identity_is_zero() {
        let fp = Fingerprint::from_u64(0xDEAD_BEEF_0000_FFFF);
        assert_eq!(fp.distance(&fp).unwrap(), 0);
    }

    #[test]
    fn distance_counts_all_differing_bits() {
        let a = Fingerprint::from_u64(0);
        let b = Fingerprint::from_u64(u64::MAX);
        assert_eq!(distance(&a, &b).unwrap(), 64);
    }

    #[test]
    fn distance_covers_remainder_bytes() {
        // 12 bytes: one full 8-byte chunk plus a 4-byte tail.
        let a = Fingerprint::from_bytes(vec![0u8; 12]).unwrap();
        let mut raw = vec![0u8; 12];
        raw[0] = 0b1000_0000;
        raw[9] = 0b0000_0011;
        raw[11] = 0xFF;
        let b = Fingerprint::from_bytes(raw).unwrap();
        assert_eq!(distance(&a, &b).unwrap(), 1 + 2 + 8);
    }

    #[test]
    fn distance_rejects_width_mismatch() {
        let a = Fingerprint::from_bytes(vec![0u8; 8]).unwrap();
        let b = Fingerprint::from_bytes(vec![0u8; 16]).unwrap();
        assert_eq!(
            distance(&a, &b),
            Err(PerceptualError::SizeMismatch {
                left: 64,
                right: 128
            })
        );
    }

    #[test]
    fn count_ones_matches_popcount() {
        let fp = Fingerprint::from_bytes(vec![0xF0, 0x01]).unwrap();
        assert_eq!(fp.count_ones(), 5);
    }

    #[test]
    fn display_is_hex() {
        let fp = Fingerprint::from_bytes(vec![0x0A, 0xFF]).unwrap();
        assert_eq!(fp.to_string(), "0aff");
    }

    #[test]
    fn serde_roundtrip() {
        let fp = Fingerprint::from_u64(42);
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
    }

    #[test]
    fn serde_rejects_empty_bytes() {
        let parsed: Result<Fingerprint, _> = serde_json::from_str("[]");
        assert!(parsed.is_err());
    }
}
