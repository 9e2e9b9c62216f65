//! Text scrubbing ahead of shingling.
//!
//! Scrubbing keeps only alphanumeric characters. Whitespace, punctuation and
//! symbols are dropped entirely (not replaced by a separator), so shingles
//! span word boundaries:
//!
//! ```text
//! "How are you? I Am fine." -> "howareyouiamfine"
//! ```

use unicode_normalization::UnicodeNormalization;

use crate::config::ShingleConfig;

/// Normalize, lowercase and strip `text` according to `cfg`.
///
/// The result contains alphanumeric characters only. Empty or
/// punctuation-only input yields an empty string.
///
/// ```rust
/// use canonical::{scrub, ShingleConfig};
///
/// let cleaned = scrub("aaa bbb test. happy time =-).", &ShingleConfig::default());
/// assert_eq!(cleaned, "aaabbbtesthappytime");
/// ```
pub fn scrub(text: &str, cfg: &ShingleConfig) -> String {
    let mut out = String::with_capacity(text.len());
    if cfg.normalize_unicode {
        push_scrubbed(text.nfkc(), cfg.lowercase, &mut out);
    } else {
        push_scrubbed(text.chars(), cfg.lowercase, &mut out);
    }
    out
}

fn push_scrubbed<I>(chars: I, lowercase: bool, out: &mut String)
where
    I: Iterator<Item = char>,
{
    for ch in chars {
        if lowercase {
            // Lowercasing may expand to several chars (e.g. 'İ'); filter each.
            out.extend(ch.to_lowercase().filter(|c| c.is_alphanumeric()));
        } else if ch.is_alphanumeric() {
            out.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whitespace_and_punctuation() {
        let cfg = ShingleConfig::default();
        let cleaned = scrub("aaa bbb test test testing. happy time =-).", &cfg);
        assert_eq!(cleaned, "aaabbbtesttesttestinghappytime");
    }

    #[test]
    fn keeps_digits() {
        let cfg = ShingleConfig::default();
        assert_eq!(scrub("thank1 2 you!", &cfg), "thank12you");
    }

    #[test]
    fn lowercase_can_be_disabled() {
        let cfg = ShingleConfig::new().with_lowercase(false);
        assert_eq!(scrub("Hello, World", &cfg), "HelloWorld");
    }

    #[test]
    fn empty_and_punctuation_only_inputs() {
        let cfg = ShingleConfig::default();
        assert_eq!(scrub("", &cfg), "");
        assert_eq!(scrub(" ?!... =-) ", &cfg), "");
    }

    #[test]
    fn nfkc_merges_equivalent_forms() {
        let cfg = ShingleConfig::default();
        let composed = scrub("Caf\u{00E9}", &cfg);
        let decomposed = scrub("Cafe\u{0301}", &cfg);
        assert_eq!(composed, decomposed);
        assert_eq!(composed, "caf\u{00E9}");
    }

    #[test]
    fn without_nfkc_combining_marks_are_dropped() {
        let cfg = ShingleConfig::new().with_normalize_unicode(false);
        // U+0301 is a combining mark, not alphanumeric.
        assert_eq!(scrub("Cafe\u{0301}", &cfg), "cafe");
    }

    #[test]
    fn compatibility_forms_fold_under_nfkc() {
        let cfg = ShingleConfig::default();
        // Fullwidth Latin letters fold to ASCII.
        assert_eq!(scrub("\u{FF21}\u{FF22}", &cfg), "ab");
    }
}
