//! Weighted bit voting over hashed features.
//!
//! Every feature is hashed to `width_bits` bits. Bit `i` of the hash casts a
//! vote of `+weight` when set and `-weight` when clear into accumulator
//! `v[i]`. The output bit `i` is 1 iff `v[i] >= 0`.
//!
//! Accumulation is a sum, so feature order never matters, and an empty
//! feature list produces an all-ones fingerprint (every accumulator is 0).

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{validate_width, PerceptualError, SimhashConfig};
use crate::fingerprint::Fingerprint;
use crate::hasher::FeatureHasher;

/// Generate a fingerprint from unit-weight features.
///
/// ```rust
/// use perceptual::{generate, Sha256Hasher};
///
/// let a = generate(&["howa", "owar", "ware"], 64, &Sha256Hasher).unwrap();
/// let b = generate(&["ware", "howa", "owar"], 64, &Sha256Hasher).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn generate<S, H>(
    features: &[S],
    width_bits: usize,
    hasher: &H,
) -> Result<Fingerprint, PerceptualError>
where
    S: AsRef<str>,
    H: FeatureHasher + ?Sized,
{
    validate_width(width_bits)?;
    let votes = accumulate(features.iter().map(|f| (f.as_ref(), 1)), width_bits, hasher);
    Ok(pack(&votes))
}

/// Generate a fingerprint from `(feature, weight)` pairs.
///
/// A weight of zero contributes nothing; unit weights reduce to
/// [`generate`].
pub fn generate_weighted<S, H>(
    features: &[(S, u32)],
    width_bits: usize,
    hasher: &H,
) -> Result<Fingerprint, PerceptualError>
where
    S: AsRef<str>,
    H: FeatureHasher + ?Sized,
{
    validate_width(width_bits)?;
    let votes = accumulate(
        features.iter().map(|(f, w)| (f.as_ref(), *w)),
        width_bits,
        hasher,
    );
    Ok(pack(&votes))
}

fn accumulate<'a, I, H>(features: I, width_bits: usize, hasher: &H) -> Vec<i64>
where
    I: Iterator<Item = (&'a str, u32)>,
    H: FeatureHasher + ?Sized,
{
    let mut votes = vec![0i64; width_bits];
    let mut scratch = vec![0u8; width_bits / 8];
    for (feature, weight) in features {
        vote(feature, weight, hasher, &mut scratch, &mut votes);
    }
    votes
}

fn accumulate_parallel<'a, I, H>(features: I, width_bits: usize, hasher: &H) -> Vec<i64>
where
    I: ParallelIterator<Item = (&'a str, u32)>,
    H: FeatureHasher + ?Sized,
{
    features
        .fold(
            || (vec![0i64; width_bits], vec![0u8; width_bits / 8]),
            |(mut votes, mut scratch), (feature, weight)| {
                vote(feature, weight, hasher, &mut scratch, &mut votes);
                (votes, scratch)
            },
        )
        .map(|(votes, _)| votes)
        .reduce(
            || vec![0i64; width_bits],
            |mut acc, part| {
                for (a, p) in acc.iter_mut().zip(part) {
                    *a += p;
                }
                acc
            },
        )
}

#[inline]
fn vote<H>(feature: &str, weight: u32, hasher: &H, scratch: &mut [u8], votes: &mut [i64])
where
    H: FeatureHasher + ?Sized,
{
    if weight == 0 {
        return;
    }
    hasher.hash_into(feature, scratch);
    let w = i64::from(weight);
    for (i, v) in votes.iter_mut().enumerate() {
        if scratch[i / 8] & (0x80 >> (i % 8)) != 0 {
            *v += w;
        } else {
            *v -= w;
        }
    }
}

fn pack(votes: &[i64]) -> Fingerprint {
    let mut bytes = vec![0u8; votes.len() / 8];
    for (i, v) in votes.iter().enumerate() {
        if *v >= 0 {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    Fingerprint::from_raw(bytes)
}

/// Reusable generator bound to a validated width and hash back-end.
#[derive(Clone)]
pub struct Simhasher {
    width_bits: usize,
    use_parallel: bool,
    hasher: Arc<dyn FeatureHasher>,
}

impl Simhasher {
    /// Build a generator from configuration.
    pub fn new(cfg: &SimhashConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        Ok(Self {
            width_bits: cfg.width_bits,
            use_parallel: cfg.use_parallel,
            hasher: cfg.hasher.build(cfg.seed),
        })
    }

    /// Build a generator around a caller-supplied back-end.
    pub fn with_hasher(
        width_bits: usize,
        hasher: Arc<dyn FeatureHasher>,
    ) -> Result<Self, PerceptualError> {
        validate_width(width_bits)?;
        Ok(Self {
            width_bits,
            use_parallel: false,
            hasher,
        })
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn width_bits(&self) -> usize {
        self.width_bits
    }

    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// Fingerprint unit-weight features.
    pub fn fingerprint<S>(&self, features: &[S]) -> Fingerprint
    where
        S: AsRef<str> + Sync,
    {
        let hasher = self.hasher.as_ref();
        let votes = if self.use_parallel {
            accumulate_parallel(
                features.par_iter().map(|f| (f.as_ref(), 1)),
                self.width_bits,
                hasher,
            )
        } else {
            accumulate(
                features.iter().map(|f| (f.as_ref(), 1)),
                self.width_bits,
                hasher,
            )
        };
        pack(&votes)
    }

    /// Fingerprint weighted features.
    pub fn fingerprint_weighted<S>(&self, features: &[(S, u32)]) -> Fingerprint
    where
        S: AsRef<str> + Sync,
    {
        let hasher = self.hasher.as_ref();
        let votes = if self.use_parallel {
            accumulate_parallel(
                features.par_iter().map(|(f, w)| (f.as_ref(), *w)),
                self.width_bits,
                hasher,
            )
        } else {
            accumulate(
                features.iter().map(|(f, w)| (f.as_ref(), *w)),
                self.width_bits,
                hasher,
            )
        };
        pack(&votes)
    }
}

impl fmt::Debug for Simhasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simhasher")
            .field("width_bits", &self.width_bits)
            .field("use_parallel", &self.use_parallel)
            .field("hasher", &self.hasher.name())
            .finish()
    }
}
