//! Identity resolution
//!
//! Two independent gates decide whether evidence is about the queried person:
//! - [`Disambiguator`]: cheap name + country check with a hard country veto
//! - [`EntityLinker`]: five-signal weighted identity score for final accept/reject

pub mod disambiguator;
pub mod linker;

pub use disambiguator::{Disambiguation, Disambiguator};
pub use linker::{EntityLinker, LinkInput};

use crate::normalize::normalize_key;

/// Name similarity in [0, 1]
///
/// Normalized Levenshtein similarity over case-folded, whitespace-collapsed
/// names. Identical names score 1.0; two empty names score 1.0.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize_key(a), &normalize_key(b))
}

/// Both values known (non-blank) and equal after key normalization
pub(crate) fn known_and_equal(a: &str, b: &str) -> Option<bool> {
    let a = normalize_key(a);
    let b = normalize_key(b);
    if a.is_empty() || b.is_empty() {
        None
    } else {
        Some(a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_similarity_identical_and_folded() {
        assert_eq!(name_similarity("Bola Tinubu", "Bola Tinubu"), 1.0);
        assert_eq!(name_similarity("  bola   TINUBU", "Bola Tinubu"), 1.0);
    }

    #[test]
    fn test_name_similarity_partial() {
        let score = name_similarity("Bola Tinubu", "Bola Tinubo");
        assert!(score > 0.85 && score < 1.0, "got {}", score);
        assert!(name_similarity("Bola Tinubu", "Atiku Abubakar") < 0.4);
    }

    #[test]
    fn test_known_and_equal() {
        assert_eq!(known_and_equal("NG", " ng "), Some(true));
        assert_eq!(known_and_equal("NG", "GH"), Some(false));
        assert_eq!(known_and_equal("", "GH"), None);
    }
}
