//! Pluggable feature hash back-ends.
//!
//! Generation only needs one capability from a hash: map a feature string to
//! `width_bits / 8` deterministic bytes. [`FeatureHasher`] captures that, so
//! new back-ends can be added without touching generation or the
//! [`Fingerprint`](crate::Fingerprint) type.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_128_with_seed;

/// Maps a feature to a fixed-width bit string.
pub trait FeatureHasher: Send + Sync {
    /// Short identifier used in logs and metadata.
    fn name(&self) -> &'static str;

    /// Fill all of `out` with the hash of `feature`.
    ///
    /// Must be deterministic for a given `(feature, out.len())`.
    fn hash_into(&self, feature: &str, out: &mut [u8]);

    /// Hash `feature` into a freshly allocated `width_bits / 8` byte buffer.
    fn hash(&self, feature: &str, width_bits: usize) -> Vec<u8> {
        let mut out = vec![0u8; width_bits / 8];
        self.hash_into(feature, &mut out);
        out
    }
}

/// SHA-256 back-end.
///
/// The 32-byte digest is repeated to fill widths above 256 bits and
/// truncated below.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl FeatureHasher for Sha256Hasher {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn hash_into(&self, feature: &str, out: &mut [u8]) {
        let digest = Sha256::digest(feature.as_bytes());
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = digest[i % digest.len()];
        }
    }
}

/// XXH3 back-end.
///
/// Output is built from consecutive 128-bit blocks, block `n` hashed with
/// seed `seed + n` and written big-endian, so any width is covered with
/// independent bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3Hasher {
    seed: u64,
}

impl Xxh3Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl FeatureHasher for Xxh3Hasher {
    fn name(&self) -> &'static str {
        "xxh3"
    }

    fn hash_into(&self, feature: &str, out: &mut [u8]) {
        let input = feature.as_bytes();
        for (block, chunk) in out.chunks_mut(16).enumerate() {
            let h = xxh3_128_with_seed(input, self.seed.wrapping_add(block as u64));
            chunk.copy_from_slice(&h.to_be_bytes()[..chunk.len()]);
        }
    }
}

/// Adapter turning a closure into a [`FeatureHasher`].
///
/// ```rust
/// use perceptual::{generate, FnHasher};
///
/// let constant = FnHasher::new("ones", |_feature: &str, out: &mut [u8]| out.fill(0xFF));
/// let fp = generate(&["a", "b"], 16, &constant).unwrap();
/// assert_eq!(fp.as_bytes(), &[0xFF, 0xFF]);
/// ```
pub struct FnHasher<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHasher<F>
where
    F: Fn(&str, &mut [u8]) + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> FeatureHasher for FnHasher<F>
where
    F: Fn(&str, &mut [u8]) + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn hash_into(&self, feature: &str, out: &mut [u8]) {
        (self.f)(feature, out)
    }
}
