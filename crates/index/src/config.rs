//! Configuration and error types for the near-duplicate index.

use perceptual::{validate_width, DEFAULT_WIDTH_BITS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default distance threshold, which is also the partition count.
pub const DEFAULT_DISTANCE_THRESHOLD: usize = 3;

/// Config for initializing the index.
///
/// `distance_threshold` (k) doubles as the number of partitions each
/// fingerprint is split into. Recall for every fingerprint within distance
/// k depends on the two being equal; see [`crate::partition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    /// Width of every indexed fingerprint, in bits.
    pub width_bits: usize,
    /// Maximum Hamming distance reported as a near duplicate.
    pub distance_threshold: usize,
    /// Derive partition keys on the rayon pool during bulk loads.
    pub use_parallel: bool,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width_bits(mut self, width_bits: usize) -> Self {
        self.width_bits = width_bits;
        self
    }

    pub fn with_distance_threshold(mut self, distance_threshold: usize) -> Self {
        self.distance_threshold = distance_threshold;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), IndexError> {
        validate_width(self.width_bits).map_err(|e| IndexError::InvalidConfig(e.to_string()))?;
        if self.distance_threshold == 0 {
            return Err(IndexError::InvalidConfig(
                "distance_threshold must be >= 1 (got 0)".into(),
            ));
        }
        if self.distance_threshold > self.width_bits {
            return Err(IndexError::InvalidConfig(format!(
                "distance_threshold {} exceeds width_bits {}",
                self.distance_threshold, self.width_bits
            )));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            width_bits: DEFAULT_WIDTH_BITS,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            use_parallel: false,
        }
    }
}

/// Custom error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid index configuration: {0}")]
    InvalidConfig(String),
    #[error("fingerprint width {actual} does not match index width {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}
