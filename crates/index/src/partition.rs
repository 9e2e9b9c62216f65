//! Partition layout and partition-key derivation.
//!
//! A fingerprint of `width_bits` bits is split into `parts` contiguous,
//! disjoint groups scanned from the most significant bit. The first
//! `width_bits % parts` groups hold `width_bits / parts + 1` bits, the rest
//! hold `width_bits / parts`.
//!
//! ```text
//! width=64 parts=10
//! | 7 | 7 | 7 | 7 | 6 | 6 | 6 | 6 | 6 | 6 |
//!   0   1   2   3   4   5   6   7   8   9
//! ```
//!
//! Each group becomes one key, `"{group}-{base64(bits)}"`, with the group's
//! bits packed left-aligned into the fewest bytes. The group index keeps
//! identical bit patterns from different groups apart.
//!
//! Recall: fingerprints at distance `d < parts` always share at least one
//! key, since `d` differing bits cannot touch all `parts` disjoint groups.
//! At `d == parts` every group may differ in exactly one bit; lookups cover
//! that case by also probing the one-bit neighbours of a single group
//! ([`PartitionLayout::neighbor_keys`]).

use std::iter::FusedIterator;
use std::ops::Range;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use perceptual::{validate_width, Fingerprint};

use crate::config::IndexError;

/// How a fingerprint width is cut into partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionLayout {
    width_bits: usize,
    parts: usize,
}

impl PartitionLayout {
    /// Fails unless `width_bits` is a positive multiple of 8 and
    /// `1 <= parts <= width_bits`.
    pub fn new(width_bits: usize, parts: usize) -> Result<Self, IndexError> {
        validate_width(width_bits).map_err(|e| IndexError::InvalidConfig(e.to_string()))?;
        if parts == 0 || parts > width_bits {
            return Err(IndexError::InvalidConfig(format!(
                "partition count must be within 1..={width_bits} (got {parts})"
            )));
        }
        Ok(Self { width_bits, parts })
    }

    pub fn width_bits(&self) -> usize {
        self.width_bits
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Width of group `group` in bits. Zero past the last group.
    pub fn group_width(&self, group: usize) -> usize {
        if group >= self.parts {
            return 0;
        }
        let base = self.width_bits / self.parts;
        let remainder = self.width_bits % self.parts;
        base + usize::from(group < remainder)
    }

    /// Bit positions covered by group `group`.
    pub fn group_range(&self, group: usize) -> Range<usize> {
        let base = self.width_bits / self.parts;
        let remainder = self.width_bits % self.parts;
        let start = group * base + group.min(remainder);
        start..start + self.group_width(group)
    }

    /// Group widths in scan order. They always sum to `width_bits`.
    pub fn widths(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.parts).map(move |g| self.group_width(g))
    }

    /// Partition keys of `fp`, in group order.
    pub fn keys<'a>(&self, fp: &'a Fingerprint) -> Result<PartitionKeys<'a>, IndexError> {
        if fp.width_bits() != self.width_bits {
            return Err(IndexError::SizeMismatch {
                expected: self.width_bits,
                actual: fp.width_bits(),
            });
        }
        Ok(PartitionKeys {
            layout: *self,
            bytes: fp.as_bytes(),
            next: 0,
        })
    }

    /// Keys of `group` with exactly one bit of `fp`'s slice flipped, one
    /// key per bit of the group.
    ///
    /// If `fp` and another fingerprint differ in exactly one bit of every
    /// group, the other fingerprint's key for `group` is among these.
    pub fn neighbor_keys(
        &self,
        fp: &Fingerprint,
        group: usize,
    ) -> Result<Vec<String>, IndexError> {
        if fp.width_bits() != self.width_bits {
            return Err(IndexError::SizeMismatch {
                expected: self.width_bits,
                actual: fp.width_bits(),
            });
        }
        let range = self.group_range(group);
        let slice = extract_bits(fp.as_bytes(), range.clone());
        let mut out = Vec::with_capacity(range.len());
        for j in 0..range.len() {
            let mut flipped = slice.clone();
            flipped[j / 8] ^= 0x80 >> (j % 8);
            out.push(format!("{group}-{}", STANDARD.encode(&flipped)));
        }
        Ok(out)
    }

    /// Group with the fewest bits; the cheapest one to enumerate neighbours of.
    pub fn narrowest_group(&self) -> usize {
        self.parts - 1
    }
}

/// Iterator over the partition keys of one fingerprint.
///
/// Yields exactly `parts` keys and can be recreated at will from the layout.
#[derive(Debug, Clone)]
pub struct PartitionKeys<'a> {
    layout: PartitionLayout,
    bytes: &'a [u8],
    next: usize,
}

impl Iterator for PartitionKeys<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.layout.parts {
            return None;
        }
        let group = self.next;
        self.next += 1;
        let slice = extract_bits(self.bytes, self.layout.group_range(group));
        Some(format!("{group}-{}", STANDARD.encode(slice)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.parts - self.next.min(self.layout.parts);
        (left, Some(left))
    }
}

impl ExactSizeIterator for PartitionKeys<'_> {}

impl FusedIterator for PartitionKeys<'_> {}

/// Copy bit positions `range` of `bytes` into a fresh buffer, left-aligned
/// and zero-padded in the last byte.
pub fn extract_bits(bytes: &[u8], range: Range<usize>) -> Vec<u8> {
    let mut out = vec![0u8; range.len().div_ceil(8)];
    for (j, i) in range.enumerate() {
        if bytes[i / 8] & (0x80 >> (i % 8)) != 0 {
            out[j / 8] |= 0x80 >> (j % 8);
        }
    }
    out
}
