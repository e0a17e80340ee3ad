//! PEP taxonomy classification
//!
//! Ordered levels; the first level with a role contained (case-insensitive)
//! in any held position wins.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PepLevel {
    Level1,
    Level2,
    Associated,
    /// Confirmed by structured evidence without a taxonomy match
    Unclassified,
    NotPep,
}

impl PepLevel {
    pub fn label(self) -> &'static str {
        match self {
            PepLevel::Level1 => "High Risk (Level 1)",
            PepLevel::Level2 => "Medium Risk (Level 2)",
            PepLevel::Associated => "Associated PEP",
            PepLevel::Unclassified => "PEP",
            PepLevel::NotPep => "Not a PEP",
        }
    }

    pub fn is_pep(self) -> bool {
        !matches!(self, PepLevel::NotPep)
    }
}

impl fmt::Display for PepLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PepLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classification outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyMatch {
    pub pep_level: PepLevel,
    pub matched_role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PepTaxonomy {
    levels: Vec<(PepLevel, Vec<String>)>,
}

impl Default for PepTaxonomy {
    fn default() -> Self {
        Self {
            levels: vec![
                level(
                    PepLevel::Level1,
                    &[
                        "Head of State",
                        "President",
                        "Vice President",
                        "Prime Minister",
                        "Governor",
                        "Deputy Governor",
                        "Minister",
                        "Commissioner",
                        "Senator",
                        "Member of House of Representatives",
                        "Chief Justice",
                        "Justice of Supreme Court",
                        "Chief of Defence Staff",
                        "Inspector General of Police",
                        "Central Bank Governor",
                        "EFCC Chairman",
                        "ICPC Chairman",
                    ],
                ),
                level(
                    PepLevel::Level2,
                    &[
                        "Permanent Secretary",
                        "Local Government Chairman",
                        "Director General",
                        "Board Chairman (Government)",
                        "Ambassador",
                        "High Commissioner",
                        "Senior Military Officer",
                        "State House Adviser",
                    ],
                ),
                level(
                    PepLevel::Associated,
                    &["Spouse", "Child", "Sibling", "Close Associate", "Business Partner"],
                ),
            ],
        }
    }
}

fn level(level: PepLevel, roles: &[&str]) -> (PepLevel, Vec<String>) {
    (level, roles.iter().map(|r| r.to_string()).collect())
}

impl PepTaxonomy {
    pub fn classify(&self, positions: &[String]) -> TaxonomyMatch {
        let positions: Vec<String> = positions.iter().map(|p| p.to_lowercase()).collect();

        for (level, roles) in &self.levels {
            for role in roles {
                let needle = role.to_lowercase();
                if positions.iter().any(|p| p.contains(&needle)) {
                    return TaxonomyMatch {
                        pep_level: *level,
                        matched_role: Some(role.clone()),
                    };
                }
            }
        }

        TaxonomyMatch {
            pep_level: PepLevel::NotPep,
            matched_role: None,
        }
    }
}
