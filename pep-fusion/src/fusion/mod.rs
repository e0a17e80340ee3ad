// Fusion Module - Multi-source evidence fusion
//
// Architecture: validated claims/roles → group by canonical key → fuse
// confidence (probabilistic OR or value selection) → resolve contradictions.
//
// Fusion is pure and synchronous: no I/O, no clock, no shared state.

pub mod conflict;
pub mod evidence;
pub mod roles;

pub use conflict::ConflictResolver;
pub use evidence::{select_value, EvidenceFusionEngine, ValueSelection};
pub use roles::RoleAggregator;

/// Source confidence score (0.0-1.0)
pub type Confidence = f64;

/// Hard cap on every fused confidence: no evidence is absolute certainty
pub const MAX_CONFIDENCE: Confidence = 0.99;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Bayesian update: posterior = 1 - (1 - prior) * (1 - evidence)
pub fn bayesian_update(prior: Confidence, evidence: Confidence) -> Confidence {
    1.0 - (1.0 - prior) * (1.0 - evidence)
}

/// Probabilistic OR over (source weight, confidence) pairs
///
/// Each evidence is adjusted to `min(weight * confidence, 0.99)` before the
/// update. Result is capped at 0.99 and rounded to 3 decimals. Empty input
/// yields 0.0.
pub fn bayesian_or<I>(evidence: I) -> Confidence
where
    I: IntoIterator<Item = (f64, Confidence)>,
{
    let fused = evidence.into_iter().fold(0.0, |posterior, (weight, confidence)| {
        let adjusted = (weight * confidence).min(MAX_CONFIDENCE);
        bayesian_update(posterior, adjusted)
    });

    round_to(fused.min(MAX_CONFIDENCE), 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayesian_update_strengthens_confidence() {
        let posterior = bayesian_update(0.7, 0.8);
        assert!(posterior > 0.7);
        assert!(posterior > 0.8);
    }

    #[test]
    fn test_bayesian_or_known_value() {
        // 1 - (1 - 0.85*0.9)(1 - 0.75*0.8) = 1 - 0.235*0.4 = 0.906
        let fused = bayesian_or([(0.85, 0.9), (0.75, 0.8)]);
        assert!((fused - 0.906).abs() < 1e-9, "got {}", fused);
    }

    #[test]
    fn test_bayesian_or_is_capped() {
        let fused = bayesian_or([(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(fused, MAX_CONFIDENCE);
    }

    #[test]
    fn test_bayesian_or_empty_is_zero() {
        assert_eq!(bayesian_or(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(74.999, 2), 75.0);
        assert_eq!(round_to(0.675, 1), 0.7);
    }
}
