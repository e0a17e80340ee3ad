// Entity Linker - weighted identity score for final accept/reject
//
// Signals (evaluated and recorded in this order):
//   name similarity     0.35 (scaled by similarity)
//   country match       0.20 (no veto)
//   position overlap    0.20 (any shared title after key normalization)
//   organisation match  0.15 (both non-empty, equal)
//   source credibility  0.10 (scaled by credibility)

use super::{known_and_equal, name_similarity};
use crate::fusion::round_to;
use crate::normalize::normalize_key;
use crate::types::EntityLinkResult;
use std::collections::HashSet;

const NAME_WEIGHT: f64 = 0.35;
const COUNTRY_WEIGHT: f64 = 0.20;
const POSITION_WEIGHT: f64 = 0.20;
const ORGANISATION_WEIGHT: f64 = 0.15;
const CREDIBILITY_WEIGHT: f64 = 0.10;

/// Everything the linker compares, query side against candidate side
#[derive(Debug, Clone)]
pub struct LinkInput<'a> {
    pub query_name: &'a str,
    pub candidate_name: &'a str,
    pub query_country: &'a str,
    pub candidate_country: &'a str,
    pub query_positions: &'a [String],
    pub candidate_positions: &'a [String],
    pub query_org: &'a str,
    pub candidate_org: &'a str,
    pub source_credibility: f64,
}

impl<'a> LinkInput<'a> {
    /// Names only; every other signal starts unknown, credibility 1.0
    pub fn new(query_name: &'a str, candidate_name: &'a str) -> Self {
        Self {
            query_name,
            candidate_name,
            query_country: "",
            candidate_country: "",
            query_positions: &[],
            candidate_positions: &[],
            query_org: "",
            candidate_org: "",
            source_credibility: 1.0,
        }
    }

    pub fn countries(mut self, query: &'a str, candidate: &'a str) -> Self {
        self.query_country = query;
        self.candidate_country = candidate;
        self
    }

    pub fn positions(mut self, query: &'a [String], candidate: &'a [String]) -> Self {
        self.query_positions = query;
        self.candidate_positions = candidate;
        self
    }

    pub fn organisations(mut self, query: &'a str, candidate: &'a str) -> Self {
        self.query_org = query;
        self.candidate_org = candidate;
        self
    }

    pub fn source_credibility(mut self, credibility: f64) -> Self {
        self.source_credibility = credibility;
        self
    }
}

#[derive(Debug, Clone)]
pub struct EntityLinker {
    threshold: f64,
}

impl Default for EntityLinker {
    fn default() -> Self {
        Self { threshold: 0.65 }
    }
}

impl EntityLinker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score identity evidence; confidence clamped to [0, 1], 2 decimals
    pub fn link(&self, input: &LinkInput<'_>) -> EntityLinkResult {
        let mut confidence = 0.0;
        let mut signals = Vec::with_capacity(5);

        let name_score = name_similarity(input.query_name, input.candidate_name);
        confidence += name_score * NAME_WEIGHT;
        signals.push(format!("Name similarity: {:.2}", name_score));

        if known_and_equal(input.query_country, input.candidate_country) == Some(true) {
            confidence += COUNTRY_WEIGHT;
            signals.push("Country match".to_string());
        }

        if positions_overlap(input.query_positions, input.candidate_positions) {
            confidence += POSITION_WEIGHT;
            signals.push("Position match".to_string());
        }

        if known_and_equal(input.query_org, input.candidate_org) == Some(true) {
            confidence += ORGANISATION_WEIGHT;
            signals.push("Organization match".to_string());
        }

        let credibility = if input.source_credibility.is_finite() {
            input.source_credibility.clamp(0.0, 1.0)
        } else {
            0.0
        };
        confidence += credibility * CREDIBILITY_WEIGHT;
        signals.push(format!("Source credibility: {}", credibility));

        EntityLinkResult {
            confidence: round_to(confidence.clamp(0.0, 1.0), 2),
            signals,
        }
    }

    /// Accept/reject gate at the configured threshold
    pub fn accepts(&self, result: &EntityLinkResult) -> bool {
        result.confidence >= self.threshold
    }
}

fn positions_overlap(query: &[String], candidate: &[String]) -> bool {
    let query: HashSet<String> = query
        .iter()
        .map(|p| normalize_key(p))
        .filter(|p| !p.is_empty())
        .collect();
    candidate
        .iter()
        .any(|p| query.contains(&normalize_key(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_signals_maximal_is_full_confidence() {
        let positions = vec!["Governor".to_string()];
        let input = LinkInput::new("Babajide Sanwo-Olu", "Babajide Sanwo-Olu")
            .countries("NG", "NG")
            .positions(&positions, &positions)
            .organisations("Lagos State Government", "Lagos State Government")
            .source_credibility(1.0);

        let result = EntityLinker::default().link(&input);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(
            result.signals,
            vec![
                "Name similarity: 1.00",
                "Country match",
                "Position match",
                "Organization match",
                "Source credibility: 1",
            ]
        );
    }

    #[test]
    fn test_name_and_credibility_only() {
        let input = LinkInput::new("Peter Obi", "peter obi").source_credibility(0.5);
        let result = EntityLinker::default().link(&input);
        // 0.35 + 0.05
        assert_eq!(result.confidence, 0.4);
        assert!(!EntityLinker::default().accepts(&result));
    }

    #[test]
    fn test_country_mismatch_does_not_veto() {
        let input = LinkInput::new("Peter Obi", "Peter Obi").countries("NG", "GH");
        let result = EntityLinker::default().link(&input);
        assert_eq!(result.confidence, 0.45);
    }

    #[test]
    fn test_position_overlap_is_key_normalized() {
        let query = vec!["  governor ".to_string(), "Senator".to_string()];
        let candidate = vec!["GOVERNOR".to_string()];
        assert!(positions_overlap(&query, &candidate));
        assert!(!positions_overlap(&query, &[]));
    }

    #[test]
    fn test_credibility_is_clamped() {
        let input = LinkInput::new("A", "A").source_credibility(7.0);
        let result = EntityLinker::default().link(&input);
        assert_eq!(result.confidence, 0.45);
    }

    #[test]
    fn test_accepts_at_threshold() {
        let linker = EntityLinker::new(0.65);
        let at = EntityLinkResult { confidence: 0.65, signals: vec![] };
        let below = EntityLinkResult { confidence: 0.64, signals: vec![] };
        assert!(linker.accepts(&at));
        assert!(!linker.accepts(&below));
    }
}
