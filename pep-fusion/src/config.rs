//! Engine configuration and static lookup tables
//!
//! All tables are immutable once built and are injected into the components
//! that need them. Every lookup has a documented fallback, so a missing entry
//! is never an error:
//! - source weight: 0.5
//! - role priority: 10
//! - publisher credibility: 0.5
//!
//! The TOML file may override or extend any built-in entry.

use crate::normalize::normalize_key;
use crate::types::EvidenceType;
use pep_common::config::LoggingConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Fallback weight for sources missing from the table
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.5;

/// Fallback priority for titles missing from the table
pub const DEFAULT_ROLE_PRIORITY: u32 = 10;

/// Fallback credibility for unknown publishers
pub const DEFAULT_CREDIBILITY: f64 = 0.5;

const BUILTIN_SOURCE_WEIGHTS: &[(&str, f64)] = &[
    ("opensanctions", 1.0),
    ("registry", 1.0),
    ("everypolitician", 0.95),
    ("official_registry", 0.9),
    ("wikidata", 0.85),
    ("news", 0.75),
    ("media", 0.6),
    ("llm", 0.4),
];

const BUILTIN_ROLE_PRIORITIES: &[(&str, u32)] = &[
    ("President", 100),
    ("Head of State", 100),
    ("Prime Minister", 95),
    ("Vice President", 90),
    ("Governor", 85),
    ("Minister", 80),
    ("Senator", 75),
    ("Deputy Governor", 70),
    ("Chief Justice", 70),
    ("Member of House of Representatives", 60),
    ("Commissioner", 60),
    ("Ambassador", 50),
    ("Permanent Secretary", 50),
    ("Director General", 45),
    ("Local Government Chairman", 40),
];

const BUILTIN_CREDIBILITY: &[(&str, f64)] = &[
    ("opensanctions", 0.95),
    ("opensanctions.org", 0.95),
    ("everypolitician", 0.9),
    ("reuters.com", 0.95),
    ("bbc.com", 0.95),
    ("bbc.co.uk", 0.95),
    ("apnews.com", 0.9),
    ("theguardian.com", 0.9),
    ("aljazeera.com", 0.85),
    ("premiumtimesng.com", 0.85),
    ("thecable.ng", 0.8),
    ("punchng.com", 0.8),
    ("vanguardngr.com", 0.75),
    ("channelstv.com", 0.75),
];

// ============================================================================
// Source weights
// ============================================================================

/// Source → reliability weight in [0, 1]
#[derive(Debug, Clone)]
pub struct SourceWeightTable {
    weights: HashMap<String, f64>,
}

impl Default for SourceWeightTable {
    fn default() -> Self {
        Self::from_entries(BUILTIN_SOURCE_WEIGHTS.iter().map(|(k, v)| (k.to_string(), *v)))
    }
}

impl SourceWeightTable {
    /// Build a table from explicit entries only (no built-ins)
    pub fn from_entries(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            weights: entries
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v.clamp(0.0, 1.0)))
                .collect(),
        }
    }

    /// Built-in table with `overrides` applied on top
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (source, weight) in overrides {
            table
                .weights
                .insert(normalize_key(source), weight.clamp(0.0, 1.0));
        }
        table
    }

    /// Reliability weight for `source` (0.5 when unknown)
    pub fn weight(&self, source: &str) -> f64 {
        self.weights
            .get(&normalize_key(source))
            .copied()
            .unwrap_or(DEFAULT_SOURCE_WEIGHT)
    }
}

// ============================================================================
// Role priorities
// ============================================================================

/// Canonical title → authority rank (higher outranks lower)
#[derive(Debug, Clone)]
pub struct RolePriorityTable {
    priorities: HashMap<String, u32>,
}

impl Default for RolePriorityTable {
    fn default() -> Self {
        Self {
            priorities: BUILTIN_ROLE_PRIORITIES
                .iter()
                .map(|(k, v)| (normalize_key(k), *v))
                .collect(),
        }
    }
}

impl RolePriorityTable {
    /// Built-in table with `overrides` applied on top
    pub fn with_overrides(overrides: &HashMap<String, u32>) -> Self {
        let mut table = Self::default();
        for (title, priority) in overrides {
            table.priorities.insert(normalize_key(title), *priority);
        }
        table
    }

    /// Priority for a canonical title (10 when unknown)
    pub fn priority(&self, title: &str) -> u32 {
        self.priorities
            .get(&normalize_key(title))
            .copied()
            .unwrap_or(DEFAULT_ROLE_PRIORITY)
    }
}

// ============================================================================
// Publisher credibility
// ============================================================================

/// Publisher domain → credibility in [0, 1]
#[derive(Debug, Clone)]
pub struct CredibilityTable {
    credibility: HashMap<String, f64>,
}

impl Default for CredibilityTable {
    fn default() -> Self {
        Self {
            credibility: BUILTIN_CREDIBILITY
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

impl CredibilityTable {
    /// Built-in table with `overrides` applied on top
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (domain, credibility) in overrides {
            table
                .credibility
                .insert(normalize_key(domain), credibility.clamp(0.0, 1.0));
        }
        table
    }

    /// Credibility for a media source (URL or provider name)
    ///
    /// Subdomains inherit from their parent domain
    /// (`edition.cnn.com` → `cnn.com`). Unknown sources get 0.5.
    pub fn credibility(&self, source: &str) -> f64 {
        self.lookup(source).unwrap_or(DEFAULT_CREDIBILITY)
    }

    /// Credibility for a known publisher, `None` when not in the table
    pub fn lookup(&self, source: &str) -> Option<f64> {
        let domain = extract_domain(source);
        let mut candidate = domain.as_str();
        loop {
            if let Some(value) = self.credibility.get(candidate) {
                return Some(*value);
            }
            match candidate.split_once('.') {
                Some((_, parent)) if parent.contains('.') => candidate = parent,
                _ => return None,
            }
        }
    }
}

/// Extract the publisher domain from a URL, without `www.`
///
/// Non-URL sources (provider names, bare domains) are returned key-normalized.
pub fn extract_domain(source: &str) -> String {
    match url::Url::parse(source.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.trim_start_matches("www.").to_ascii_lowercase(),
            None => normalize_key(source),
        },
        Err(_) => normalize_key(source).trim_start_matches("www.").to_string(),
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Decision thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Disambiguator match score (cheap early reject)
    pub disambiguation_match: f64,
    /// Entity linker accept threshold for PEP determination
    pub entity_link_accept: f64,
    /// Entity linker accept threshold for adverse-media items
    pub media_link_accept: f64,
    /// Minimum fused role confidence to be trusted
    pub trusted_role_confidence: f64,
    /// Minimum resolved IS_PEP confidence for the structured gate
    pub structured_pep_confidence: f64,
    /// Adverse-media items from less credible publishers are suppressed
    pub media_min_credibility: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            disambiguation_match: 0.70,
            entity_link_accept: 0.65,
            media_link_accept: 0.6,
            trusted_role_confidence: 0.75,
            structured_pep_confidence: 0.80,
            media_min_credibility: 0.7,
        }
    }
}

// ============================================================================
// Engine configuration (TOML)
// ============================================================================

/// File-backed provider registered at startup
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub evidence_type: EvidenceType,
    /// JSON file holding an array of evidence records
    pub path: PathBuf,
    #[serde(default)]
    pub credibility: Option<f64>,
}

/// Complete engine configuration
///
/// Every field has a built-in default; an empty file is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub source_weights: HashMap<String, f64>,
    pub role_priorities: HashMap<String, u32>,
    pub source_credibility: HashMap<String, f64>,
    pub thresholds: Thresholds,
    pub provider_timeout_ms: u64,
    pub providers: Vec<ProviderConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            source_weights: HashMap::new(),
            role_priorities: HashMap::new(),
            source_credibility: HashMap::new(),
            thresholds: Thresholds::default(),
            provider_timeout_ms: 15_000,
            providers: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn source_weight_table(&self) -> SourceWeightTable {
        SourceWeightTable::with_overrides(&self.source_weights)
    }

    pub fn role_priority_table(&self) -> RolePriorityTable {
        RolePriorityTable::with_overrides(&self.role_priorities)
    }

    pub fn credibility_table(&self) -> CredibilityTable {
        CredibilityTable::with_overrides(&self.source_credibility)
    }

    pub fn provider_timeout(&self) -> Duration {
        pep_common::time::millis_to_duration(self.provider_timeout_ms)
    }
}
