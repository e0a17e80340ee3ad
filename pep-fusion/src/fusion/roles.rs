// Role Aggregator - Role-specialized Bayesian OR fusion
//
// Grouping key: (title, organisation, country, start year, end year), all text
// fields key-normalized. Differing years never merge.

use super::{bayesian_or, MAX_CONFIDENCE};
use crate::config::SourceWeightTable;
use crate::normalize::normalize_key;
use crate::types::{DiscoveredRole, ResolvedRole};
use std::collections::HashMap;
use tracing::debug;

type RoleKey = (String, String, String, Option<i32>, Option<i32>);

/// Merges role mentions from several sources into canonical roles
#[derive(Debug, Clone)]
pub struct RoleAggregator {
    weights: SourceWeightTable,
}

impl Default for RoleAggregator {
    fn default() -> Self {
        Self::new(SourceWeightTable::default())
    }
}

impl RoleAggregator {
    pub fn new(weights: SourceWeightTable) -> Self {
        Self { weights }
    }

    /// Aggregate discovered roles, one resolved role per group in first-seen order
    pub fn aggregate(&self, roles: &[DiscoveredRole]) -> Vec<ResolvedRole> {
        let mut order: Vec<RoleKey> = Vec::new();
        let mut groups: HashMap<RoleKey, Vec<&DiscoveredRole>> = HashMap::new();

        for role in roles {
            let key = role_key(role);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(role);
        }

        let resolved: Vec<ResolvedRole> = order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .filter_map(|group| self.merge_group(&group))
            .collect();

        debug!(
            "Role aggregation: {} discovered → {} resolved",
            roles.len(),
            resolved.len()
        );

        resolved
    }

    fn merge_group(&self, group: &[&DiscoveredRole]) -> Option<ResolvedRole> {
        let first = *group.first()?;

        if group.len() == 1 {
            return Some(ResolvedRole {
                title: first.title.clone(),
                organisation: first.organisation.clone(),
                country: first.country.clone(),
                start_year: first.start_year,
                end_year: first.end_year,
                source: first.source.clone(),
                confidence: first.confidence.min(MAX_CONFIDENCE),
                raw_reference: first.raw_reference.clone(),
                merged: vec![first.clone()],
            });
        }

        let confidence = bayesian_or(
            group
                .iter()
                .map(|r| (self.weights.weight(&r.source), r.confidence)),
        );

        // Most authoritative member supplies the fields (first on ties)
        let mut base = first;
        let mut base_weight = self.weights.weight(&first.source);
        for role in &group[1..] {
            let weight = self.weights.weight(&role.source);
            if weight > base_weight {
                base = *role;
                base_weight = weight;
            }
        }

        let mut sources: Vec<&str> = group.iter().map(|r| r.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();

        debug!(
            title = %base.title,
            members = group.len(),
            confidence,
            "Merged role group"
        );

        Some(ResolvedRole {
            title: base.title.clone(),
            organisation: base.organisation.clone(),
            country: base.country.clone(),
            start_year: base.start_year,
            end_year: base.end_year,
            source: sources.join("+"),
            confidence,
            raw_reference: base.raw_reference.clone(),
            merged: group.iter().map(|r| (*r).clone()).collect(),
        })
    }
}

fn role_key(role: &DiscoveredRole) -> RoleKey {
    (
        normalize_key(&role.title),
        normalize_key(&role.organisation),
        normalize_key(&role.country),
        role.start_year,
        role.end_year,
    )
}
