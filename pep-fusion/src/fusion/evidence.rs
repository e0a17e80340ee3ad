// Evidence Fusion Engine - Claim grouping and confidence fusion
//
// Simple claims group by (claim type, canonical value) and fuse by
// probabilistic OR. Single-answer attributes (date of birth, gender, state,
// middle name) group by type only and fuse by value selection.

use super::{bayesian_or, round_to, Confidence, MAX_CONFIDENCE};
use crate::normalize::normalize_key;
use crate::types::{Claim, ClaimType, ResolvedClaim};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Maximum boost for several sources agreeing on the winning value
const MAX_AGREEMENT_BOOST: f64 = 0.2;

/// Boost per additional agreeing source
const AGREEMENT_STEP: f64 = 0.1;

/// Flat penalty when more than one distinct value is claimed
const CONFLICT_PENALTY: f64 = 0.2;

/// Outcome of value-selection fusion
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSelection {
    /// Winning value, as first seen
    pub value: String,
    pub confidence: Confidence,
    /// Evidences agreeing with the winner
    pub support: usize,
    /// Number of distinct values claimed
    pub distinct_values: usize,
}

/// Pick the majority value among competing claims of one attribute
///
/// Ties go to the value seen first. Confidence is
/// `max(source weight) + agreement boost - conflict penalty`, clamped to
/// [0, 0.99] and rounded to 2 decimals. Empty input yields `None`.
pub fn select_value(evidence: &[Claim]) -> Option<ValueSelection> {
    if evidence.is_empty() {
        return None;
    }

    // (canonical value, first-seen original, count), first-seen order
    let mut tallies: Vec<(String, &str, usize)> = Vec::new();
    for claim in evidence {
        let key = normalize_key(&claim.claim_value);
        match tallies.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2 += 1,
            None => tallies.push((key, claim.claim_value.as_str(), 1)),
        }
    }

    let mut winner = &tallies[0];
    for tally in &tallies[1..] {
        if tally.2 > winner.2 {
            winner = tally;
        }
    }

    let base = evidence
        .iter()
        .map(|c| c.source_weight)
        .fold(0.0_f64, f64::max);
    let agreement_boost = (((winner.2 - 1) as f64) * AGREEMENT_STEP).min(MAX_AGREEMENT_BOOST);
    let conflict_penalty = if tallies.len() > 1 { CONFLICT_PENALTY } else { 0.0 };

    let confidence = (base + agreement_boost - conflict_penalty).clamp(0.0, MAX_CONFIDENCE);

    Some(ValueSelection {
        value: winner.1.to_string(),
        confidence: round_to(confidence, 2),
        support: winner.2,
        distinct_values: tallies.len(),
    })
}

/// Groups claims that refer to the same fact and fuses their confidence
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceFusionEngine;

impl EvidenceFusionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fuse claims into resolved claims, one per group, in first-seen order
    pub fn resolve(&self, claims: &[Claim]) -> Vec<ResolvedClaim> {
        let mut order: Vec<GroupKey> = Vec::new();
        let mut groups: HashMap<GroupKey, Vec<&Claim>> = HashMap::new();

        for claim in claims {
            let key = GroupKey::for_claim(claim);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(claim);
        }

        let resolved: Vec<ResolvedClaim> = order
            .into_iter()
            .filter_map(|key| {
                let group = groups.remove(&key)?;
                if key.value.is_none() {
                    fuse_by_selection(&group)
                } else {
                    fuse_by_or(&group)
                }
            })
            .collect();

        debug!(
            "Evidence fusion: {} claims → {} resolved claims",
            claims.len(),
            resolved.len()
        );

        resolved
    }
}

/// Grouping key: value is `None` for single-answer attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    claim_type: ClaimType,
    value: Option<String>,
}

impl GroupKey {
    fn for_claim(claim: &Claim) -> Self {
        let value = if claim.claim_type.is_single_valued() {
            None
        } else {
            Some(normalize_key(&claim.claim_value))
        };
        Self {
            claim_type: claim.claim_type.clone(),
            value,
        }
    }
}

fn fuse_by_or(group: &[&Claim]) -> Option<ResolvedClaim> {
    let first = group.first()?;

    let confidence = if group.len() == 1 {
        first.confidence.min(MAX_CONFIDENCE)
    } else {
        bayesian_or(group.iter().map(|c| (c.source_weight, c.confidence)))
    };

    // Boolean values are reported canonically ("true"/"false")
    let claim_value = if first.claim_type.is_boolean() {
        normalize_key(&first.claim_value)
    } else {
        first.claim_value.clone()
    };

    debug!(
        claim_type = %first.claim_type,
        value = %claim_value,
        evidences = group.len(),
        confidence,
        "Fused claim group"
    );

    Some(build_resolved(first.claim_type.clone(), claim_value, confidence, group, group))
}

fn fuse_by_selection(group: &[&Claim]) -> Option<ResolvedClaim> {
    let first = group.first()?;
    let owned: Vec<Claim> = group.iter().map(|c| (*c).clone()).collect();
    let selection = select_value(&owned)?;

    let winning_key = normalize_key(&selection.value);
    let support: Vec<&Claim> = group
        .iter()
        .copied()
        .filter(|c| normalize_key(&c.claim_value) == winning_key)
        .collect();

    debug!(
        claim_type = %first.claim_type,
        value = %selection.value,
        support = selection.support,
        distinct = selection.distinct_values,
        confidence = selection.confidence,
        "Selected attribute value"
    );

    Some(build_resolved(
        first.claim_type.clone(),
        selection.value,
        selection.confidence,
        &support,
        group,
    ))
}

/// Sources come from `support`; provenance keeps every evidence in `all`
fn build_resolved(
    claim_type: ClaimType,
    claim_value: String,
    confidence: Confidence,
    support: &[&Claim],
    all: &[&Claim],
) -> ResolvedClaim {
    let mut sources: Vec<String> = Vec::new();
    for claim in support {
        if !sources.contains(&claim.source) {
            sources.push(claim.source.clone());
        }
    }

    let start_date: Option<NaiveDate> = support.iter().filter_map(|c| c.start_date).min();
    let end_date: Option<NaiveDate> = support.iter().filter_map(|c| c.end_date).max();

    ResolvedClaim {
        claim_type,
        claim_value,
        confidence,
        sources,
        evidences: all.iter().map(|c| (*c).clone()).collect(),
        start_date,
        end_date,
    }
}
