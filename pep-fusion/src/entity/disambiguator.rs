// Disambiguator - early reject for candidates that are clearly someone else
//
// score = name_similarity * 0.6 (+ 0.3 when both countries are known and equal)
// A known country mismatch vetoes outright (no match, confidence 0.0).

use super::{known_and_equal, name_similarity};
use crate::fusion::round_to;
use serde::{Deserialize, Serialize};

const NAME_WEIGHT: f64 = 0.6;
const COUNTRY_BONUS: f64 = 0.3;

/// Disambiguation verdict with human-readable reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disambiguation {
    pub is_match: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Disambiguator {
    threshold: f64,
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self { threshold: 0.70 }
    }
}

impl Disambiguator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decide whether `candidate_name` refers to the queried person
    ///
    /// Empty countries are "unknown" and neither add nor veto.
    pub fn disambiguate(
        &self,
        query_name: &str,
        candidate_name: &str,
        query_country: &str,
        candidate_country: &str,
    ) -> Disambiguation {
        let mut reasons = Vec::new();

        let name_score = name_similarity(query_name, candidate_name);
        let mut score = name_score * NAME_WEIGHT;
        reasons.push(format!("Name similarity score: {:.2}", name_score));

        match known_and_equal(query_country, candidate_country) {
            Some(true) => {
                score += COUNTRY_BONUS;
                reasons.push("Country match".to_string());
            }
            Some(false) => {
                reasons.push("Country mismatch".to_string());
                return Disambiguation {
                    is_match: false,
                    confidence: 0.0,
                    reasons,
                };
            }
            None => {}
        }

        Disambiguation {
            is_match: score >= self.threshold,
            confidence: round_to(score, 2),
            reasons,
        }
    }
}
