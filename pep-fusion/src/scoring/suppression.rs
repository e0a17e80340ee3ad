// Suppression Filter - false-positive suppression for adverse media
//
// Marks (never deletes) adverse-media items that:
//   (a) do not name the subject among their persons
//   (b) have an entity-link confidence below the media threshold
//   (c) come from a publisher below the minimum credibility
//   (d) are not Negative after classification
//
// The first failing rule is recorded. Structured PEP items are never suppressed.

use crate::config::DEFAULT_CREDIBILITY;
use crate::normalize::normalize_key;
use crate::types::{EvidenceType, MediaItem, Sentiment, SuppressionReason};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SuppressionFilter {
    link_threshold: f64,
    min_credibility: f64,
}

impl Default for SuppressionFilter {
    fn default() -> Self {
        Self {
            link_threshold: 0.6,
            min_credibility: 0.7,
        }
    }
}

impl SuppressionFilter {
    pub fn new(link_threshold: f64, min_credibility: f64) -> Self {
        Self {
            link_threshold,
            min_credibility,
        }
    }

    /// Reason `item` should be suppressed, if any
    pub fn check(&self, subject: &str, item: &MediaItem) -> Option<SuppressionReason> {
        if item.evidence_type == EvidenceType::StructuredPep {
            return None;
        }

        let subject = normalize_key(subject);
        if !item.persons.iter().any(|p| normalize_key(p) == subject) {
            return Some(SuppressionReason::SubjectNotMentioned);
        }

        if item.entity_link_confidence.unwrap_or(0.0) < self.link_threshold {
            return Some(SuppressionReason::WeakEntityLink);
        }

        // Unresolved credibility counts as an unknown publisher
        if item.credibility_score.unwrap_or(DEFAULT_CREDIBILITY) < self.min_credibility {
            return Some(SuppressionReason::LowCredibility);
        }

        if item.sentiment != Sentiment::Negative {
            return Some(SuppressionReason::NotAdverse);
        }

        None
    }

    /// Mark items in place; returns how many are newly suppressed
    pub fn apply(&self, subject: &str, items: &mut [MediaItem]) -> usize {
        let mut suppressed = 0;
        for item in items.iter_mut().filter(|i| i.is_active()) {
            if let Some(reason) = self.check(subject, item) {
                debug!(headline = %item.headline, ?reason, "Suppressed media item");
                item.suppressed = Some(reason);
                suppressed += 1;
            }
        }
        suppressed
    }
}
