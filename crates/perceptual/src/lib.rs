//! # Simdex Perceptual Fingerprinting
//!
//! This crate turns a bag of features (usually character shingles produced by
//! the `canonical` crate) into a compact simhash [`Fingerprint`] such that
//! similar documents produce fingerprints differing in few bits, and measures
//! that difference with the Hamming [`distance`].
//!
//! ## Contract
//!
//! - The perceptual layer **only** consumes feature strings. It never scrubs
//!   or tokenizes text itself.
//! - Generation is a pure function of `(features, width_bits, hasher)`:
//!   no I/O, no clocks, no global state.
//! - Feature order is irrelevant. The vote accumulation is commutative.
//!
//! ## Algorithm
//!
//! 1.  Every feature is hashed to `width_bits` bits through a pluggable
//!     [`FeatureHasher`] ([`Sha256Hasher`] or the faster [`Xxh3Hasher`]).
//! 2.  Each hash bit votes `+weight` (set) or `-weight` (clear) into a
//!     per-position accumulator.
//! 3.  Output bit `i` is 1 iff its accumulator is `>= 0`; bits are packed
//!     most-significant first.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{HasherKind, SimhashConfig, Simhasher};
//!
//! let cfg = SimhashConfig::new().with_hasher(HasherKind::Sha256);
//! let simhasher = Simhasher::new(&cfg).unwrap();
//!
//! let a = simhasher.fingerprint(&["howa", "owar", "ware", "arey", "reyo", "eyou"]);
//! let b = simhasher.fingerprint(&["howa", "owar", "ware", "arey", "reyo", "eyow"]);
//!
//! assert_eq!(a.width_bits(), 64);
//! assert!(a.distance(&b).unwrap() < 32);
//! ```

pub mod config;
pub mod fingerprint;
pub mod hasher;
mod simhash;

pub use crate::config::{
    validate_width, HasherKind, PerceptualError, SimhashConfig, DEFAULT_WIDTH_BITS,
};
pub use crate::fingerprint::{distance, Fingerprint};
pub use crate::hasher::{FeatureHasher, FnHasher, Sha256Hasher, Xxh3Hasher};
pub use crate::simhash::{generate, generate_weighted, Simhasher};
