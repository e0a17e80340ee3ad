//! Current / previous role resolution
//!
//! Splits trusted roles into exactly one current title and a list of previous
//! titles, using the role priority table with confidence as tie-break.
//!
//! Only one current title is ever reported, even when the data shows several
//! concurrent offices.

use crate::config::RolePriorityTable;
use crate::normalize::normalize_key;
use crate::types::ResolvedRole;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Result of splitting roles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleSplit {
    /// At most one entry
    pub current: Vec<String>,
    /// Deduplicated, first-seen order
    pub previous: Vec<String>,
}

impl RoleSplit {
    pub fn current_title(&self) -> Option<&str> {
        self.current.first().map(String::as_str)
    }
}

/// Keep roles whose fused confidence reaches `min_confidence`
pub fn trusted(roles: &[ResolvedRole], min_confidence: f64) -> Vec<ResolvedRole> {
    roles
        .iter()
        .filter(|r| r.confidence >= min_confidence)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct RoleResolver {
    priorities: RolePriorityTable,
}

impl RoleResolver {
    pub fn new(priorities: RolePriorityTable) -> Self {
        Self { priorities }
    }

    pub fn priority(&self, title: &str) -> u32 {
        self.priorities.priority(title)
    }

    /// Split roles into current and previous titles
    ///
    /// 1. Roles that ended before `current_year` are previous
    /// 2. Among the rest, roles with an explicit start and no (or future) end
    ///    are "dated current"; when none exist every remaining role competes
    /// 3. Highest (priority, confidence) wins; every other title is previous
    pub fn split(&self, roles: &[ResolvedRole], current_year: i32) -> RoleSplit {
        let ended: HashSet<String> = roles
            .iter()
            .filter(|r| matches!(r.end_year, Some(end) if end < current_year))
            .map(|r| normalize_key(&r.title))
            .collect();

        let candidates: Vec<&ResolvedRole> = roles
            .iter()
            .filter(|r| !ended.contains(&normalize_key(&r.title)))
            .collect();

        let dated_current: Vec<&ResolvedRole> = candidates
            .iter()
            .copied()
            .filter(|r| {
                r.start_year.is_some() && r.end_year.map_or(true, |end| end >= current_year)
            })
            .collect();

        let mut active = if dated_current.is_empty() {
            candidates
        } else {
            dated_current
        };

        // Stable: ties keep input order
        active.sort_by(|a, b| {
            self.priority(&b.title)
                .cmp(&self.priority(&a.title))
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let primary = active.first().map(|r| normalize_key(&r.title));

        let mut split = RoleSplit::default();
        let mut seen = HashSet::new();
        if let Some(primary_key) = &primary {
            if let Some(role) = roles.iter().find(|r| &normalize_key(&r.title) == primary_key) {
                split.current.push(role.title.clone());
                seen.insert(primary_key.clone());
            }
        }

        for role in roles {
            let key = normalize_key(&role.title);
            if seen.insert(key) {
                split.previous.push(role.title.clone());
            }
        }

        debug!(
            current = ?split.current_title(),
            previous = split.previous.len(),
            "Role split"
        );

        split
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscoveredRole;

    fn role(title: &str, start: Option<i32>, end: Option<i32>, confidence: f64) -> ResolvedRole {
        let discovered = DiscoveredRole::new(title, "", "NG", "wikidata", confidence).with_years(start, end);
        ResolvedRole {
            title: title.to_string(),
            organisation: String::new(),
            country: "NG".to_string(),
            start_year: start,
            end_year: end,
            source: "wikidata".to_string(),
            confidence,
            raw_reference: None,
            merged: vec![discovered],
        }
    }

    #[test]
    fn test_trusted_filters_by_confidence() {
        let roles = vec![role("Governor", None, None, 0.8), role("Senator", None, None, 0.5)];
        let kept = trusted(&roles, 0.75);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Governor");
    }

    #[test]
    fn test_ended_roles_are_previous() {
        let resolver = RoleResolver::default();
        let roles = vec![
            role("Governor", Some(1999), Some(2007), 0.95),
            role("President", Some(2023), None, 0.9),
        ];
        let split = resolver.split(&roles, 2026);
        assert_eq!(split.current, vec!["President"]);
        assert_eq!(split.previous, vec!["Governor"]);
    }

    #[test]
    fn test_dated_current_preferred_over_undated() {
        let resolver = RoleResolver::default();
        let roles = vec![
            role("President", None, None, 0.9),
            role("Senator", Some(2023), None, 0.8),
        ];
        let split = resolver.split(&roles, 2026);
        assert_eq!(split.current, vec!["Senator"]);
        assert_eq!(split.previous, vec!["President"]);
    }

    #[test]
    fn test_priority_then_confidence() {
        let resolver = RoleResolver::default();
        let roles = vec![
            role("Commissioner", None, None, 0.99),
            role("Minister", None, None, 0.8),
            role("Governor", None, None, 0.8),
        ];
        let split = resolver.split(&roles, 2026);
        assert_eq!(split.current, vec!["Governor"]);
        assert_eq!(split.previous, vec!["Commissioner", "Minister"]);
    }

    #[test]
    fn test_never_more_than_one_current() {
        let resolver = RoleResolver::default();
        let roles = vec![
            role("Governor", Some(2019), None, 0.9),
            role("Governor", Some(2019), None, 0.9),
            role("Senator", Some(2019), Some(2030), 0.9),
            role("Minister", Some(2020), None, 0.9),
        ];
        let split = resolver.split(&roles, 2026);
        assert_eq!(split.current.len(), 1);
        assert_eq!(split.previous, vec!["Senator", "Minister"]);
    }

    #[test]
    fn test_all_ended_has_no_current() {
        let resolver = RoleResolver::default();
        let roles = vec![
            role("Senator", Some(2003), Some(2007), 0.9),
            role("Senator", Some(2011), Some(2015), 0.9),
        ];
        let split = resolver.split(&roles, 2026);
        assert!(split.current.is_empty());
        assert_eq!(split.previous, vec!["Senator"]);
    }

    #[test]
    fn test_empty_input() {
        let split = RoleResolver::default().split(&[], 2026);
        assert_eq!(split, RoleSplit::default());
    }
}
