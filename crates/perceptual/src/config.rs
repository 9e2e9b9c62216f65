//! Configuration and error types for simhash generation.
//!
//! This module defines the public configuration surface for fingerprint
//! generation. It is free of any I/O so that generation stays a pure
//! function of `(features, config)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hasher::{FeatureHasher, Sha256Hasher, Xxh3Hasher};

/// Default fingerprint width in bits.
pub const DEFAULT_WIDTH_BITS: usize = 64;

/// Feature hash back-end selectable from configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HasherKind {
    /// SHA-256 digest stretched or truncated to the target width.
    Sha256,
    /// XXH3-128 blocks computed at the target width. Much faster than SHA-256.
    #[default]
    Xxh3,
}

impl HasherKind {
    /// Build the hasher for this kind. `seed` only affects seeded back-ends.
    pub fn build(self, seed: u64) -> Arc<dyn FeatureHasher> {
        match self {
            HasherKind::Sha256 => Arc::new(Sha256Hasher),
            HasherKind::Xxh3 => Arc::new(Xxh3Hasher::with_seed(seed)),
        }
    }
}

/// Configuration for fingerprint generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimhashConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version, so that old fingerprints stay comparable.
    pub version: u32,
    /// Fingerprint width in bits. Must be a positive multiple of 8.
    pub width_bits: usize,
    /// Feature hash back-end.
    pub hasher: HasherKind,
    /// Seed for seeded back-ends.
    ///
    /// Fingerprints produced under different seeds are not comparable.
    pub seed: u64,
    /// Accumulate votes on the rayon pool. Worth it only for very long
    /// feature lists; the result is identical either way.
    pub use_parallel: bool,
}

impl SimhashConfig {
    /// Create a new configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fingerprint width. Typical values: 64, 128.
    pub fn with_width_bits(mut self, width_bits: usize) -> Self {
        self.width_bits = width_bits;
        self
    }

    /// Select the feature hash back-end.
    pub fn with_hasher(mut self, hasher: HasherKind) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        validate_width(self.width_bits)
    }
}

impl Default for SimhashConfig {
    fn default() -> Self {
        Self {
            version: 1,
            width_bits: DEFAULT_WIDTH_BITS,
            hasher: HasherKind::default(),
            seed: 0,
            use_parallel: false,
        }
    }
}

/// Check that `width_bits` is a positive multiple of 8.
pub fn validate_width(width_bits: usize) -> Result<(), PerceptualError> {
    if width_bits == 0 || width_bits % 8 != 0 {
        return Err(PerceptualError::InvalidWidth { width_bits });
    }
    Ok(())
}

/// Errors returned by fingerprint construction, generation and comparison.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: width_bits must be a positive multiple of 8 (got {width_bits})")]
    InvalidWidth { width_bits: usize },

    #[error("fingerprint size mismatch: {left} bits vs {right} bits")]
    SizeMismatch { left: usize, right: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("fingerprint must hold at least one byte")]
    EmptyFingerprint,
}
