//! Name canonicalization used for matching units across collections.

use unicode_normalization::UnicodeNormalization;

/// Canonical decomposition with combining diacritical marks (U+0300..=U+036F) removed.
///
/// Only used to compare names; stored names are never rewritten.
pub fn canonicalize(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_diacritic(*c)).collect()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}
