// Risk Aggregator - per-item scoring, weighted aggregate, risk band
//
// final_score = raw score * credibility * sentiment multiplier * recency decay,
// clamped to [0, 100], 2 decimals. Structured PEP evidence is recorded with
// its credibility but always scores 0.0.
//
// weighted_score = Σ(final * credibility) / Σ(credibility) over scored,
// non-suppressed items.

use super::decay::TemporalDecayScorer;
use crate::config::{CredibilityTable, DEFAULT_CREDIBILITY};
use crate::fusion::round_to;
use crate::types::{EvidenceType, MediaItem};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, info};

/// Score at or above which the subject is "Potential High Risk"
pub const HIGH_RISK_THRESHOLD: f64 = 75.0;

/// Score at or above which the subject is "Medium Risk"
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

const MAX_SCORE: f64 = 100.0;

/// Adverse-media risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskStatus {
    Clear,
    MediumRisk,
    PotentialHighRisk,
}

impl RiskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskStatus::Clear => "Clear",
            RiskStatus::MediumRisk => "Medium Risk",
            RiskStatus::PotentialHighRisk => "Potential High Risk",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map a weighted score to its risk band
pub fn derive_risk_status(score: f64) -> RiskStatus {
    if score >= HIGH_RISK_THRESHOLD {
        RiskStatus::PotentialHighRisk
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskStatus::MediumRisk
    } else {
        RiskStatus::Clear
    }
}

#[derive(Debug, Clone)]
pub struct RiskAggregator {
    credibility: CredibilityTable,
    decay: TemporalDecayScorer,
}

impl RiskAggregator {
    pub fn new(credibility: CredibilityTable, decay: TemporalDecayScorer) -> Self {
        Self { credibility, decay }
    }

    /// Credibility for an item
    ///
    /// Known publisher domains use the table; otherwise a credibility the
    /// provider already attached is kept; otherwise 0.5.
    pub fn credibility_for(&self, item: &MediaItem) -> f64 {
        self.credibility
            .lookup(&item.source)
            .or(item.credibility_score)
            .unwrap_or(DEFAULT_CREDIBILITY)
    }

    /// Score one item in place, returning its final score
    pub fn score_item(&self, item: &mut MediaItem) -> f64 {
        let credibility = self.credibility_for(item);
        item.credibility_score = Some(credibility);

        if item.evidence_type == EvidenceType::StructuredPep {
            item.final_score = Some(0.0);
            return 0.0;
        }

        let decay = self.decay.item_decay(&item.date);
        let raw = item.score * credibility * item.sentiment.multiplier() * decay;
        let final_score = round_to(raw.clamp(0.0, MAX_SCORE), 2);
        item.final_score = Some(final_score);

        debug!(
            headline = %item.headline,
            credibility,
            sentiment = %item.sentiment,
            decay,
            final_score,
            "Scored media item"
        );

        final_score
    }

    /// Score every active item; suppressed items are left unscored
    pub fn score_all(&self, items: &mut [MediaItem]) {
        for item in items.iter_mut().filter(|i| i.is_active()) {
            self.score_item(item);
        }
    }

    /// Credibility-weighted mean of final scores
    ///
    /// Suppressed and unscored items are ignored; a zero credibility weight
    /// falls back to 0.5. No eligible items → 0.0.
    pub fn calculate_weighted_score(items: &[MediaItem]) -> f64 {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for item in items.iter().filter(|i| i.is_active()) {
            let Some(final_score) = item.final_score else {
                continue;
            };
            let weight = match item.credibility_score {
                Some(c) if c > 0.0 => c,
                _ => DEFAULT_CREDIBILITY,
            };
            weighted_sum += final_score * weight;
            total_weight += weight;
        }

        if total_weight == 0.0 {
            return 0.0;
        }

        let score = round_to(weighted_sum / total_weight, 2);
        info!(score, "Weighted adverse-media score");
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sentiment, SuppressionReason};
    use chrono::NaiveDate;

    fn aggregator() -> RiskAggregator {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        RiskAggregator::new(CredibilityTable::default(), TemporalDecayScorer::new(today))
    }

    #[test]
    fn test_derive_risk_status_boundaries() {
        assert_eq!(derive_risk_status(74.99).as_str(), "Medium Risk");
        assert_eq!(derive_risk_status(75.0).as_str(), "Potential High Risk");
        assert_eq!(derive_risk_status(39.99).as_str(), "Clear");
        assert_eq!(derive_risk_status(40.0), RiskStatus::MediumRisk);
    }

    #[test]
    fn test_score_item_formula() {
        let mut item = MediaItem::new("2026-03-01", "https://www.reuters.com/a", "h", 60.0, Sentiment::Negative);
        // 60 * 0.95 * 1.5 * 1.0
        assert_eq!(aggregator().score_item(&mut item), 85.5);
        assert_eq!(item.credibility_score, Some(0.95));
    }

    #[test]
    fn test_score_item_clamped_to_100() {
        let mut item = MediaItem::new("2026-03-01", "https://www.bbc.com/x", "h", 100.0, Sentiment::Negative);
        assert_eq!(aggregator().score_item(&mut item), 100.0);
    }

    #[test]
    fn test_score_item_unknown_publisher_and_old_date() {
        let mut item = MediaItem::new("2019-01-01", "https://blog.example/x", "h", 80.0, Sentiment::Positive);
        // 80 * 0.5 * 0.3 * 0.2
        assert_eq!(aggregator().score_item(&mut item), 2.4);
    }

    #[test]
    fn test_provider_credibility_used_for_unknown_publisher() {
        let mut item = MediaItem::new("2026-03-01", "registry-feed", "h", 50.0, Sentiment::Neutral);
        item.credibility_score = Some(0.8);
        assert_eq!(aggregator().score_item(&mut item), 40.0);
    }

    #[test]
    fn test_structured_pep_always_zero() {
        let mut item = MediaItem::new("2026-03-01", "OpenSanctions", "PEP entry", 100.0, Sentiment::Negative);
        item.evidence_type = EvidenceType::StructuredPep;
        assert_eq!(aggregator().score_item(&mut item), 0.0);
        assert_eq!(item.final_score, Some(0.0));
        assert_eq!(item.credibility_score, Some(0.95));
    }

    #[test]
    fn test_weighted_score_excludes_suppressed() {
        let mut a = MediaItem::new("2026-03-01", "x", "a", 0.0, Sentiment::Negative);
        a.final_score = Some(80.0);
        a.credibility_score = Some(0.9);
        let mut b = MediaItem::new("2026-03-01", "y", "b", 0.0, Sentiment::Negative);
        b.final_score = Some(20.0);
        b.credibility_score = Some(0.0);
        let mut c = MediaItem::new("2026-03-01", "z", "c", 0.0, Sentiment::Negative);
        c.final_score = Some(100.0);
        c.credibility_score = Some(1.0);
        c.suppressed = Some(SuppressionReason::WeakEntityLink);

        // (80*0.9 + 20*0.5) / (0.9 + 0.5)
        let score = RiskAggregator::calculate_weighted_score(&[a, b, c]);
        assert_eq!(score, 58.57);
    }

    #[test]
    fn test_weighted_score_empty() {
        assert_eq!(RiskAggregator::calculate_weighted_score(&[]), 0.0);
    }
}
