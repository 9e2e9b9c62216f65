//! Overlapping character shingles.

use crate::config::ShingleConfig;
use crate::error::CanonicalError;
use crate::scrub::scrub;

/// Cut `content` into overlapping windows of `width` characters.
///
/// Produces `max(len - width + 1, 1)` windows for non-empty content, so a
/// string shorter than `width` becomes a single feature holding the whole
/// string. Empty content produces no features. Windows are measured in
/// `char`s, never split inside a UTF-8 sequence.
///
/// A `width` of zero is treated as one.
///
/// ```rust
/// use canonical::slide;
///
/// assert_eq!(slide("aaabbb", 4), vec!["aaab", "aabb", "abbb"]);
/// assert_eq!(slide("ab", 4), vec!["ab"]);
/// assert!(slide("", 4).is_empty());
/// ```
pub fn slide(content: &str, width: usize) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    let width = width.max(1);

    // Byte offset of every char boundary, plus the end of the string.
    let mut bounds: Vec<usize> = content.char_indices().map(|(idx, _)| idx).collect();
    let char_len = bounds.len();
    bounds.push(content.len());

    if char_len <= width {
        return vec![content.to_string()];
    }

    let mut out = Vec::with_capacity(char_len - width + 1);
    for start in 0..=(char_len - width) {
        out.push(content[bounds[start]..bounds[start + width]].to_string());
    }
    out
}

/// Scrub `text` and cut it into shingles of `cfg.width` characters.
///
/// This is the feature extractor used ahead of simhash generation.
///
/// ```rust
/// use canonical::{tokenize, ShingleConfig};
///
/// let features = tokenize("This is a test!", &ShingleConfig::new().with_width(3)).unwrap();
/// assert_eq!(features.first().map(String::as_str), Some("thi"));
/// assert_eq!(features.len(), 9);
/// ```
pub fn tokenize(text: &str, cfg: &ShingleConfig) -> Result<Vec<String>, CanonicalError> {
    cfg.validate()?;
    let cleaned = scrub(text, cfg);
    Ok(slide(&cleaned, cfg.width))
}
