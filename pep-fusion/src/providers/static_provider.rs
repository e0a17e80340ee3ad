//! Static evidence provider
//!
//! Serves a fixed record set, built in memory or loaded from a JSON file
//! holding an array of tagged records:
//!
//! ```json
//! [
//!   {"kind": "role", "title": "Governor", "source": "wikidata", "confidence": 0.9},
//!   {"kind": "claim", "claim_type": "IS_PEP", "claim_value": "true", "source": "registry", "confidence": 0.9},
//!   {"kind": "media", "date": "2025-02-01", "source": "https://punchng.com/a", "headline": "...", "score": 70}
//! ]
//! ```
//!
//! Media items are filtered by subject mention and the query date window.
//! Roles and claims are served as-is; identity checks happen downstream.

use super::{EvidenceProvider, ProviderQuery};
use crate::config::ProviderConfig;
use crate::normalize::normalize_key;
use crate::types::{EvidenceRecord, EvidenceType, MediaItem, ProviderError};
use std::path::Path;
use tracing::info;

pub struct StaticProvider {
    name: String,
    evidence_type: EvidenceType,
    credibility: f64,
    records: Vec<EvidenceRecord>,
}

impl StaticProvider {
    pub fn new(
        name: impl Into<String>,
        evidence_type: EvidenceType,
        records: Vec<EvidenceRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            evidence_type,
            credibility: 0.5,
            records,
        }
    }

    /// Override the default credibility (clamped to [0, 1])
    pub fn with_credibility(mut self, credibility: f64) -> Self {
        self.credibility = credibility.clamp(0.0, 1.0);
        self
    }

    /// Load records from a JSON array file
    pub fn from_json_file(
        name: impl Into<String>,
        evidence_type: EvidenceType,
        path: &Path,
    ) -> Result<Self, ProviderError> {
        let name = name.into();
        let content = std::fs::read_to_string(path)?;
        let records: Vec<EvidenceRecord> = serde_json::from_str(&content).map_err(|e| {
            ProviderError::Malformed(format!("{}: {}", path.display(), e))
        })?;

        info!(
            provider = %name,
            path = %path.display(),
            records = records.len(),
            "Loaded static evidence"
        );

        Ok(Self::new(name, evidence_type, records))
    }

    /// Build from a `[[providers]]` config entry
    ///
    /// A configured path that does not exist leaves the provider unavailable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        if !config.path.exists() {
            return Err(ProviderError::NotAvailable(format!(
                "{}: {} does not exist",
                config.name,
                config.path.display()
            )));
        }
        let provider = Self::from_json_file(&config.name, config.evidence_type, &config.path)?;
        Ok(match config.credibility {
            Some(credibility) => provider.with_credibility(credibility),
            None => provider,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn mentions(item: &MediaItem, subject: &str) -> bool {
    let subject = normalize_key(subject);
    item.persons.iter().any(|p| normalize_key(p) == subject)
        || normalize_key(&item.headline).contains(&subject)
        || normalize_key(&item.excerpt).contains(&subject)
}

#[async_trait::async_trait]
impl EvidenceProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn evidence_type(&self) -> EvidenceType {
        self.evidence_type
    }

    fn default_credibility(&self) -> f64 {
        self.credibility
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<EvidenceRecord>, ProviderError> {
        Ok(self
            .records
            .iter()
            .filter(|record| match record {
                EvidenceRecord::Media(item) => {
                    mentions(item, &query.name) && query.in_window(&item.date)
                }
                EvidenceRecord::Role(_) | EvidenceRecord::Claim(_) => true,
            })
            .cloned()
            .collect())
    }
}
