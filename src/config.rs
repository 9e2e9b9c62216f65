//! YAML configuration file support for simdex.
//!
//! One YAML file describes every stage of the near-duplicate pipeline
//! (shingling, fingerprint generation, index) and is loaded at runtime.
//! Every section and every field is optional and falls back to the stage
//! defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "news dedup"
//!
//! shingle:
//!   version: 1
//!   width: 4
//!   normalize_unicode: true
//!   lowercase: true
//!
//! fingerprint:
//!   version: 1
//!   width_bits: 64
//!   hasher: xxh3
//!   seed: 0
//!   use_parallel: false
//!
//! index:
//!   distance_threshold: 3
//!   use_parallel: false
//! ```

use std::fs;
use std::path::Path;

use canonical::{DEFAULT_SHINGLE_WIDTH, ShingleConfig};
use index::{DEFAULT_DISTANCE_THRESHOLD, IndexConfig};
use perceptual::{DEFAULT_WIDTH_BITS, HasherKind, SimhashConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SimdexConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub shingle: ShingleYamlConfig,

    #[serde(default)]
    pub fingerprint: FingerprintYamlConfig,

    #[serde(default)]
    pub index: IndexYamlConfig,
}

impl SimdexConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SimdexConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.shingle_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("shingle: {e}")))?;
        self.simhash_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fingerprint: {e}")))?;

        if let Some(index_width) = self.index.width_bits
            && index_width != self.fingerprint.width_bits
        {
            return Err(ConfigLoadError::Validation(format!(
                "index.width_bits {index_width} does not match fingerprint.width_bits {}",
                self.fingerprint.width_bits
            )));
        }
        self.index_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("index: {e}")))?;

        Ok(())
    }

    pub fn shingle_config(&self) -> ShingleConfig {
        ShingleConfig {
            version: self.shingle.version,
            width: self.shingle.width,
            normalize_unicode: self.shingle.normalize_unicode,
            lowercase: self.shingle.lowercase,
        }
    }

    pub fn simhash_config(&self) -> SimhashConfig {
        SimhashConfig {
            version: self.fingerprint.version,
            width_bits: self.fingerprint.width_bits,
            hasher: self.fingerprint.hasher,
            seed: self.fingerprint.seed,
            use_parallel: self.fingerprint.use_parallel,
        }
    }

    /// Index settings. The width always follows `fingerprint.width_bits`.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new()
            .with_width_bits(self.fingerprint.width_bits)
            .with_distance_threshold(self.index.distance_threshold)
            .with_parallel(self.index.use_parallel)
    }
}

impl Default for SimdexConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            shingle: ShingleYamlConfig::default(),
            fingerprint: FingerprintYamlConfig::default(),
            index: IndexYamlConfig::default(),
        }
    }
}

/// Shingling stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShingleYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_shingle_width")]
    pub width: usize,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default = "true_value")]
    pub lowercase: bool,
}

impl Default for ShingleYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            width: DEFAULT_SHINGLE_WIDTH,
            normalize_unicode: true,
            lowercase: true,
        }
    }
}

/// Fingerprint generation YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_width_bits")]
    pub width_bits: usize,

    #[serde(default)]
    pub hasher: HasherKind,

    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub use_parallel: bool,
}

impl Default for FingerprintYamlConfig {
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

/// Index YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexYamlConfig {
    /// Optional cross-check; must equal `fingerprint.width_bits` when set.
    #[serde(default)]
    pub width_bits: Option<usize>,

    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: usize,

    #[serde(default)]
    pub use_parallel: bool,
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            width_bits: None,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            use_parallel: false,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_shingle_width() -> usize {
    DEFAULT_SHINGLE_WIDTH
}
fn default_width_bits() -> usize {
    DEFAULT_WIDTH_BITS
}
fn default_distance_threshold() -> usize {
    DEFAULT_DISTANCE_THRESHOLD
}
