// Temporal Decay Scorer
//
// Media recency decay (step function on age in years):
//   age <= 1 → 1.00
//   age <= 3 → 0.70
//   age <= 5 → 0.40
//   older    → 0.20
//
// Role enrichment adjustments:
//   news-sourced roles older than 3 years → confidence * max(0.1, 1 - (age - 3) * 0.1)
//   high-risk titles from the knowledge graph → confidence floored at 0.95

use crate::normalize::normalize_key;
use crate::types::DiscoveredRole;
use chrono::NaiveDate;
use pep_common::time::{age_in_years, parse_date};
use tracing::debug;

/// News roles older than this many years lose confidence
pub const NEWS_ROLE_DECAY_AFTER_YEARS: i32 = 3;

/// Confidence floor for high-risk titles from the knowledge graph
pub const HIGH_RISK_FLOOR: f64 = 0.95;

const HIGH_RISK_TITLES: &[&str] = &["president", "prime minister", "head of state"];

const KNOWLEDGE_GRAPH_SOURCE: &str = "wikidata";

/// Recency weight for an item of the given age
pub fn recency_decay(age_years: f64) -> f64 {
    if age_years <= 1.0 {
        1.0
    } else if age_years <= 3.0 {
        0.7
    } else if age_years <= 5.0 {
        0.4
    } else {
        0.2
    }
}

/// Confidence multiplier for a news-discovered role that started `age_years` ago
pub fn news_role_decay(age_years: i32) -> f64 {
    if age_years > NEWS_ROLE_DECAY_AFTER_YEARS {
        (1.0 - f64::from(age_years.saturating_sub(NEWS_ROLE_DECAY_AFTER_YEARS)) * 0.1).max(0.1)
    } else {
        1.0
    }
}

pub fn is_high_risk_title(title: &str) -> bool {
    HIGH_RISK_TITLES.contains(&normalize_key(title).as_str())
}

/// Date-aware decay, pinned to one `today` for the whole screening
#[derive(Debug, Clone, Copy)]
pub struct TemporalDecayScorer {
    today: NaiveDate,
}

impl TemporalDecayScorer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Age in years of an item date; unparseable dates count as today
    pub fn age_years(&self, date: &str) -> f64 {
        match parse_date(date) {
            Some(published) => age_in_years(published, self.today),
            None => {
                debug!(date, "Unparseable item date, treating as today");
                0.0
            }
        }
    }

    /// Recency decay for an item date
    pub fn item_decay(&self, date: &str) -> f64 {
        recency_decay(self.age_years(date))
    }

    /// Apply news decay and the high-risk floor to a discovered role
    ///
    /// Expects an already normalized title.
    pub fn adjust_role(&self, role: &mut DiscoveredRole, current_year: i32) {
        let source = normalize_key(&role.source);

        if source.starts_with("news") {
            if let Some(start) = role.start_year {
                let age = current_year.saturating_sub(start);
                let factor = news_role_decay(age);
                if factor < 1.0 {
                    debug!(
                        title = %role.title,
                        age,
                        factor,
                        "Decaying stale news role"
                    );
                    role.confidence *= factor;
                }
            }
        }

        if source == KNOWLEDGE_GRAPH_SOURCE && is_high_risk_title(&role.title) {
            role.confidence = role.confidence.max(HIGH_RISK_FLOOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_decay_steps() {
        assert_eq!(recency_decay(0.5), 1.0);
        assert_eq!(recency_decay(1.0), 1.0);
        assert_eq!(recency_decay(2.0), 0.7);
        assert_eq!(recency_decay(4.0), 0.4);
        assert_eq!(recency_decay(6.0), 0.2);
    }

    #[test]
    fn test_future_date_is_recent() {
        assert_eq!(recency_decay(-0.5), 1.0);
    }

    #[test]
    fn test_unparseable_date_counts_as_today() {
        let scorer = TemporalDecayScorer::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(scorer.age_years("last week"), 0.0);
        assert_eq!(scorer.item_decay("last week"), 1.0);
        assert_eq!(scorer.item_decay("2024-06-01"), 0.7);
    }

    #[test]
    fn test_news_role_decay() {
        assert_eq!(news_role_decay(3), 1.0);
        assert!((news_role_decay(5) - 0.8).abs() < 1e-9);
        assert_eq!(news_role_decay(30), 0.1);
    }

    #[test]
    fn test_adjust_role_news_decay() {
        let scorer = TemporalDecayScorer::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let mut role = DiscoveredRole::new("Governor", "", "NG", "news", 0.8).with_years(Some(2021), None);
        scorer.adjust_role(&mut role, 2026);
        // age 5 → 0.8
        assert!((role.confidence - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_role_extreme_years_saturate() {
        let scorer = TemporalDecayScorer::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        let mut ancient = DiscoveredRole::new("Senator", "", "NG", "news", 0.8).with_years(Some(i32::MIN), None);
        scorer.adjust_role(&mut ancient, i32::MAX);
        assert!((ancient.confidence - 0.08).abs() < 1e-9);

        let mut future = DiscoveredRole::new("Senator", "", "NG", "news", 0.8).with_years(Some(i32::MAX), None);
        scorer.adjust_role(&mut future, i32::MIN);
        assert_eq!(future.confidence, 0.8);
    }

    #[test]
    fn test_adjust_role_high_risk_floor_only_for_knowledge_graph() {
        let scorer = TemporalDecayScorer::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        let mut wikidata = DiscoveredRole::new("President", "", "NG", "wikidata", 0.6);
        scorer.adjust_role(&mut wikidata, 2026);
        assert_eq!(wikidata.confidence, HIGH_RISK_FLOOR);

        let mut news = DiscoveredRole::new("President", "", "NG", "news", 0.6);
        scorer.adjust_role(&mut news, 2026);
        assert_eq!(news.confidence, 0.6);

        let mut governor = DiscoveredRole::new("Governor", "", "NG", "wikidata", 0.6);
        scorer.adjust_role(&mut governor, 2026);
        assert_eq!(governor.confidence, 0.6);
    }
}
