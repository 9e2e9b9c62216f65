//! Configuration types for text shingling.
//!
//! [`ShingleConfig`] controls how raw text is scrubbed and cut into
//! overlapping character windows before fingerprinting.
//!
//! # Versioning
//!
//! Any change that can alter the produced features (scrubbing rules, window
//! semantics) must come with a version bump. Fingerprints built from
//! different versions are not comparable.
//!
//! # Examples
//!
//! ```rust
//! use canonical::ShingleConfig;
//!
//! let config = ShingleConfig::default();
//! assert_eq!(config.version, 1);
//! assert_eq!(config.width, 4);
//! assert!(config.lowercase);
//!
//! let trigrams = ShingleConfig::new().with_width(3);
//! assert!(trigrams.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Default number of characters per shingle.
pub const DEFAULT_SHINGLE_WIDTH: usize = 4;

/// Configuration for scrubbing and shingling text.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "width": 4,
///   "normalize_unicode": true,
///   "lowercase": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShingleConfig {
    /// Configuration schema version. Must be >= 1.
    pub version: u32,

    /// Number of characters per shingle.
    ///
    /// Smaller widths tolerate more local edits but make unrelated texts
    /// share more features. Must be >= 1.
    pub width: usize,

    /// If true, apply Unicode NFKC normalization before scrubbing.
    ///
    /// Composed and decomposed forms of the same text ("é" vs "e" plus a
    /// combining accent) then produce identical shingles.
    pub normalize_unicode: bool,

    /// If true, apply locale-free Unicode lowercasing.
    pub lowercase: bool,
}

impl ShingleConfig {
    /// Create a new configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shingle width in characters.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Enable or disable NFKC normalization.
    pub fn with_normalize_unicode(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    /// Enable or disable lowercasing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "version must be >= 1 (got 0)".into(),
            ));
        }
        if self.width == 0 {
            return Err(CanonicalError::InvalidConfig(
                "width must be >= 1 (got 0)".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ShingleConfig {
    fn default() -> Self {
        Self {
            version: 1,
            width: DEFAULT_SHINGLE_WIDTH,
            normalize_unicode: true,
            lowercase: true,
        }
    }
}
