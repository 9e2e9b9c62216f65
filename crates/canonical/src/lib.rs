//! Simdex text shingling layer.
//!
//! Turns raw text into the feature strings that simhash generation votes
//! over. Downstream stages never look at raw text; they only see the
//! shingles produced here.
//!
//! ## What we do
//!
//! - Unicode normalization (NFKC by default, configurable)
//! - Locale-free lowercasing
//! - Removal of everything that is not alphanumeric, whitespace included
//! - Overlapping character windows of a configurable width (4 by default)
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. The same text and config
//! produce the same shingles on any machine.
//!
//! ```rust
//! use canonical::{tokenize, ShingleConfig};
//!
//! let shingles = tokenize("How are you?", &ShingleConfig::default()).unwrap();
//! assert_eq!(shingles, vec!["howa", "owar", "ware", "arey", "reyo", "eyou"]);
//! ```

mod config;
mod error;
mod scrub;
mod shingle;

pub use crate::config::{ShingleConfig, DEFAULT_SHINGLE_WIDTH};
pub use crate::error::CanonicalError;
pub use crate::scrub::scrub;
pub use crate::shingle::{slide, tokenize};
