// Conflict Resolver - Signed-confidence voting over resolved claims
//
// Algorithm:
// 1. Group resolved claims by claim type (first-seen order)
// 2. Boolean types (IS_PEP, IS_SANCTIONED): each claim votes +confidence for
//    "true", -confidence otherwise; value is "true" iff the sum is positive,
//    confidence = |sum| / k
// 3. Multi-valued types (PEP_ROLE): several values coexist, ordered by
//    confidence descending
// 4. Everything else passes through untouched
//
// Disagreement is partial cancellation, never an error.

use super::round_to;
use crate::normalize::normalize_key;
use crate::types::{ClaimType, ResolvedClaim};
use tracing::{debug, warn};

/// Resolves contradictory resolved claims of the same type
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, claims: Vec<ResolvedClaim>) -> Vec<ResolvedClaim> {
        let mut groups: Vec<(ClaimType, Vec<ResolvedClaim>)> = Vec::new();
        for claim in claims {
            match groups.iter_mut().find(|(t, _)| *t == claim.claim_type) {
                Some((_, group)) => group.push(claim),
                None => groups.push((claim.claim_type.clone(), vec![claim])),
            }
        }

        let mut resolved = Vec::new();
        for (claim_type, mut group) in groups {
            if claim_type.is_boolean() {
                if let Some(claim) = resolve_boolean(claim_type, group) {
                    resolved.push(claim);
                }
            } else if claim_type.is_multi_valued() {
                // Stable: equal confidences keep first-seen order
                group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                resolved.extend(group);
            } else {
                resolved.extend(group);
            }
        }

        resolved
    }
}

fn resolve_boolean(claim_type: ClaimType, group: Vec<ResolvedClaim>) -> Option<ResolvedClaim> {
    if group.is_empty() {
        return None;
    }

    let votes = group.len();
    let mut score = 0.0;
    let mut affirmative = 0usize;
    let mut sources: Vec<String> = Vec::new();
    let mut evidences = Vec::new();
    let mut start_date = None;
    let mut end_date = None;

    for claim in group {
        if is_affirmative(&claim.claim_value) {
            score += claim.confidence;
            affirmative += 1;
        } else {
            score -= claim.confidence;
        }

        for source in claim.sources {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        evidences.extend(claim.evidences);
        start_date = earliest(start_date, claim.start_date);
        end_date = latest(end_date, claim.end_date);
    }

    if affirmative > 0 && affirmative < votes {
        warn!(
            claim_type = %claim_type,
            affirmative,
            negative = votes - affirmative,
            net = score,
            "Contradictory boolean claims"
        );
    }

    let claim_value = if score > 0.0 { "true" } else { "false" };
    let confidence = round_to(score.abs() / votes as f64, 2);

    debug!(
        claim_type = %claim_type,
        value = claim_value,
        confidence,
        "Resolved boolean claim"
    );

    Some(ResolvedClaim {
        claim_type,
        claim_value: claim_value.to_string(),
        confidence,
        sources,
        evidences,
        start_date,
        end_date,
    })
}

fn is_affirmative(value: &str) -> bool {
    normalize_key(value) == "true"
}

fn earliest<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
