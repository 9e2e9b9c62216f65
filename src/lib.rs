//! Workspace umbrella crate for simdex.
//!
//! This crate stitches together text shingling, simhash generation and the
//! partition-key index so callers can deduplicate text with a single API
//! entry point. The stage crates stay usable on their own; everything they
//! export is re-exported here.
//!
//! ```
//! use simdex::{DedupEngine, SimdexConfig};
//!
//! let engine: DedupEngine<u32> = DedupEngine::new(&SimdexConfig::default()).unwrap();
//! engine.insert(1, "How are you? I am fine. Thanks.").unwrap();
//!
//! let dups = engine.find_near_duplicates("How are you? I am fine. Thanks!").unwrap();
//! assert!(dups.contains(&1));
//! ```

pub mod config;

pub use crate::config::{
    ConfigLoadError, FingerprintYamlConfig, IndexYamlConfig, ShingleYamlConfig, SimdexConfig,
};
pub use canonical::{
    CanonicalError, DEFAULT_SHINGLE_WIDTH, ShingleConfig, scrub, slide, tokenize,
};
pub use index::{
    DEFAULT_DISTANCE_THRESHOLD, HashSet, IndexConfig, IndexError, NearDupIndex, NearDupMatch,
    PartitionLayout, SharedIndex,
};
pub use perceptual::{
    DEFAULT_WIDTH_BITS, FeatureHasher, Fingerprint, FnHasher, HasherKind, PerceptualError,
    Sha256Hasher, SimhashConfig, Simhasher, Xxh3Hasher, distance, generate, generate_weighted,
};

use std::error::Error;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

/// Errors that can occur while running text through the pipeline.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigLoadError),
    Canonical(CanonicalError),
    Perceptual(PerceptualError),
    Index(IndexError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "configuration rejected: {err}"),
            PipelineError::Canonical(err) => write!(f, "shingling failure: {err}"),
            PipelineError::Perceptual(err) => write!(f, "fingerprinting failed: {err}"),
            PipelineError::Index(err) => write!(f, "index failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Canonical(err) => Some(err),
            PipelineError::Perceptual(err) => Some(err),
            PipelineError::Index(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<CanonicalError> for PipelineError {
    fn from(value: CanonicalError) -> Self {
        PipelineError::Canonical(value)
    }
}

impl From<PerceptualError> for PipelineError {
    fn from(value: PerceptualError) -> Self {
        PipelineError::Perceptual(value)
    }
}

impl From<IndexError> for PipelineError {
    fn from(value: IndexError) -> Self {
        PipelineError::Index(value)
    }
}

/// Shingle `text` and fingerprint the shingles.
///
/// Text that scrubs down to nothing has no features and yields the all-ones
/// fingerprint.
pub fn fingerprint_text(
    text: &str,
    shingle_cfg: &ShingleConfig,
    simhasher: &Simhasher,
) -> Result<Fingerprint, PipelineError> {
    let features = tokenize(text, shingle_cfg)?;
    Ok(simhasher.fingerprint(&features))
}

/// Text-level near-duplicate detector.
///
/// Owns the shingling settings, a [`Simhasher`] and a [`SharedIndex`], so one
/// engine can be shared between threads behind an `Arc`.
#[derive(Debug)]
pub struct DedupEngine<I = u64> {
    shingle: ShingleConfig,
    simhasher: Simhasher,
    index: SharedIndex<I>,
}

impl<I> DedupEngine<I>
where
    I: Eq + Hash + Clone,
{
    /// Build an engine from a validated configuration.
    pub fn new(cfg: &SimdexConfig) -> Result<Self, PipelineError> {
        let simhasher = Simhasher::new(&cfg.simhash_config())?;
        Self::build(cfg, simhasher)
    }

    /// Build an engine around a caller-supplied feature hasher. The
    /// configured hasher kind and seed are ignored.
    pub fn with_hasher(
        cfg: &SimdexConfig,
        hasher: Arc<dyn FeatureHasher>,
    ) -> Result<Self, PipelineError> {
        let simhasher = Simhasher::with_hasher(cfg.fingerprint.width_bits, hasher)?
            .with_parallel(cfg.fingerprint.use_parallel);
        Self::build(cfg, simhasher)
    }

    fn build(cfg: &SimdexConfig, simhasher: Simhasher) -> Result<Self, PipelineError> {
        let start = Instant::now();
        let shingle = cfg.shingle_config();
        shingle.validate()?;
        let index_cfg = cfg.index_config();
        let index = SharedIndex::new(index_cfg.clone())?;
        // Stage checks above keep their typed errors; this adds the
        // root-level ones (format version, width cross-check).
        cfg.validate()?;

        info!(
            shingle_width = shingle.width,
            width_bits = simhasher.width_bits(),
            hasher = simhasher.hasher_name(),
            distance_threshold = index_cfg.distance_threshold,
            elapsed_micros = start.elapsed().as_micros(),
            "engine_ready"
        );
        Ok(Self {
            shingle,
            simhasher,
            index,
        })
    }

    pub fn shingle_config(&self) -> &ShingleConfig {
        &self.shingle
    }

    pub fn simhasher(&self) -> &Simhasher {
        &self.simhasher
    }

    /// Direct access to the underlying index, e.g. to add precomputed
    /// fingerprints.
    pub fn index(&self) -> &SharedIndex<I> {
        &self.index
    }

    pub fn fingerprint(&self, text: &str) -> Result<Fingerprint, PipelineError> {
        fingerprint_text(text, &self.shingle, &self.simhasher)
    }

    /// Fingerprint `text` and store it under `id`. Returns the fingerprint,
    /// which is also what [`NearDupIndex::delete`] expects.
    pub fn insert(&self, id: I, text: &str) -> Result<Fingerprint, PipelineError> {
        let start = Instant::now();
        let fp = self.fingerprint(text)?;
        self.index.add(id, &fp)?;
        debug!(
            fingerprint = %fp,
            elapsed_micros = start.elapsed().as_micros(),
            "engine_insert"
        );
        Ok(fp)
    }

    /// Remove the entry stored for `id` with the fingerprint of `text`.
    pub fn remove(&self, id: &I, text: &str) -> Result<bool, PipelineError> {
        let fp = self.fingerprint(text)?;
        Ok(self.index.delete(id, &fp))
    }

    pub fn find_near_duplicates(&self, text: &str) -> Result<HashSet<I>, PipelineError> {
        let fp = self.fingerprint(text)?;
        Ok(self.index.near_duplicates(&fp)?)
    }

    pub fn find_matches(&self, text: &str) -> Result<Vec<NearDupMatch<I>>, PipelineError> {
        let fp = self.fingerprint(text)?;
        Ok(self.index.matches(&fp)?)
    }
}
