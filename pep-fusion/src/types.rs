//! Core Types and Trait Definitions for the evidence fusion engine
//!
//! Defines the data contracts between the three layers of the engine:
//! - **Providers:** emit `EvidenceRecord`s (media items, discovered roles, raw claims)
//! - **Fusion:** turns validated `Claim`s and `DiscoveredRole`s into resolved outputs
//! - **Scoring:** enriches `MediaItem`s in place and aggregates a risk score
//!
//! Records are validated at the provider boundary. Nothing past that boundary
//! sees an unvalidated claim.

use crate::config::SourceWeightTable;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Claims
// ============================================================================

/// Explicit discriminator for a claim
///
/// Wire keys are upper snake case (`IS_PEP`, `PEP_ROLE`, ...). Parsing is
/// case and whitespace insensitive; unknown keys are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClaimType {
    IsPep,
    IsSanctioned,
    PepRole,
    DateOfBirth,
    Gender,
    State,
    MiddleName,
    Alias,
    Other(String),
}

impl ClaimType {
    /// Parse a claim type from its wire key
    pub fn parse(raw: &str) -> Self {
        let key = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace('-', "_")
            .to_ascii_uppercase();

        match key.as_str() {
            "IS_PEP" => Self::IsPep,
            "IS_SANCTIONED" => Self::IsSanctioned,
            "PEP_ROLE" => Self::PepRole,
            "DATE_OF_BIRTH" | "DOB" => Self::DateOfBirth,
            "GENDER" => Self::Gender,
            "STATE" => Self::State,
            "MIDDLE_NAME" => Self::MiddleName,
            "ALIAS" => Self::Alias,
            _ => Self::Other(key),
        }
    }

    /// Canonical wire key
    pub fn key(&self) -> &str {
        match self {
            Self::IsPep => "IS_PEP",
            Self::IsSanctioned => "IS_SANCTIONED",
            Self::PepRole => "PEP_ROLE",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::Gender => "GENDER",
            Self::State => "STATE",
            Self::MiddleName => "MIDDLE_NAME",
            Self::Alias => "ALIAS",
            Self::Other(key) => key,
        }
    }

    /// Strictly boolean claim types (resolved by signed voting)
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::IsPep | Self::IsSanctioned)
    }

    /// Non-exclusive claim types where several values may hold at once
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::PepRole)
    }

    /// Attributes that need exactly one answer (resolved by value selection)
    pub fn is_single_valued(&self) -> bool {
        matches!(
            self,
            Self::DateOfBirth | Self::Gender | Self::State | Self::MiddleName
        )
    }
}

impl From<String> for ClaimType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ClaimType> for String {
    fn from(claim_type: ClaimType) -> Self {
        claim_type.key().to_string()
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Claim as delivered by a provider, before validation
///
/// Every field is optional so that malformed provider output can be
/// deserialized and then rejected field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClaim {
    #[serde(default)]
    pub claim_type: Option<String>,
    #[serde(default)]
    pub claim_value: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Falls back to the source weight table when absent
    #[serde(default)]
    pub source_weight: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
}

/// Validated, immutable claim: the unit of input to fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: ClaimType,
    pub claim_value: String,
    pub source: String,
    pub source_weight: f64,
    pub confidence: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub retrieved_at: DateTime<Utc>,
}

impl Claim {
    /// Build a claim directly (tests and in-process providers)
    pub fn new(
        claim_type: ClaimType,
        claim_value: impl Into<String>,
        source: impl Into<String>,
        source_weight: f64,
        confidence: f64,
    ) -> Self {
        Self {
            claim_type,
            claim_value: claim_value.into(),
            source: source.into(),
            source_weight: source_weight.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            start_date: None,
            end_date: None,
            retrieved_at: Utc::now(),
        }
    }

    /// Attach an observed validity period
    pub fn with_period(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Malformed claim at the fusion boundary
///
/// The claim is dropped from its group; group fusion proceeds without it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionInputError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("invalid {field} date: {value}")]
    InvalidDate { field: &'static str, value: String },
}

impl RawClaim {
    /// Validate into a `Claim`
    ///
    /// Missing `source_weight` is looked up in `weights` (default 0.5);
    /// missing `retrieved_at` takes `retrieved_default`.
    pub fn into_claim(
        self,
        weights: &SourceWeightTable,
        retrieved_default: DateTime<Utc>,
    ) -> Result<Claim, FusionInputError> {
        let claim_type = required(self.claim_type, "claim_type")?;
        let claim_value = required(self.claim_value, "claim_value")?;
        let source = required(self.source, "source")?;

        let confidence = self
            .confidence
            .ok_or(FusionInputError::MissingField("confidence"))?;
        check_unit_range("confidence", confidence)?;

        let source_weight = match self.source_weight {
            Some(weight) => {
                check_unit_range("source_weight", weight)?;
                weight
            }
            None => weights.weight(&source),
        };

        let start_date = optional_date(self.start_date, "start_date")?;
        let end_date = optional_date(self.end_date, "end_date")?;

        Ok(Claim {
            claim_type: ClaimType::parse(&claim_type),
            claim_value: claim_value.trim().to_string(),
            source: source.trim().to_string(),
            source_weight,
            confidence,
            start_date,
            end_date,
            retrieved_at: self.retrieved_at.unwrap_or(retrieved_default),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, FusionInputError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FusionInputError::MissingField(field)),
    }
}

fn check_unit_range(field: &'static str, value: f64) -> Result<(), FusionInputError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FusionInputError::OutOfRange { field, value })
    }
}

fn optional_date(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<NaiveDate>, FusionInputError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => pep_common::time::parse_date(&raw)
            .map(Some)
            .ok_or(FusionInputError::InvalidDate { field, value: raw }),
    }
}

/// Fusion output for one fact
///
/// Invariant: `confidence <= 0.99` and `evidences` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClaim {
    pub claim_type: ClaimType,
    pub claim_value: String,
    pub confidence: f64,
    /// Deduplicated, first-seen order
    pub sources: Vec<String>,
    /// Full provenance list
    pub evidences: Vec<Claim>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// Roles
// ============================================================================

/// Role claim discovered by a single source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredRole {
    pub title: String,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    /// wikidata | registry | news | llm | ...
    pub source: String,
    pub confidence: f64,
    /// URL, SPARQL ID, or document reference
    #[serde(default)]
    pub raw_reference: Option<String>,
    /// Person the source attached this role to, when it says
    #[serde(default)]
    pub holder: Option<String>,
}

impl DiscoveredRole {
    pub fn new(
        title: impl Into<String>,
        organisation: impl Into<String>,
        country: impl Into<String>,
        source: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            title: title.into(),
            organisation: organisation.into(),
            country: country.into(),
            start_year: None,
            end_year: None,
            source: source.into(),
            confidence,
            raw_reference: None,
            holder: None,
        }
    }

    /// Set the tenure years
    pub fn with_years(mut self, start_year: Option<i32>, end_year: Option<i32>) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("role without title".to_string());
        }
        if self.source.trim().is_empty() {
            return Err(format!("role '{}' without source", self.title));
        }
        if !(self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)) {
            return Err(format!(
                "role '{}' confidence out of range: {}",
                self.title, self.confidence
            ));
        }
        Ok(())
    }
}

/// Canonical role produced by merging `DiscoveredRole`s
///
/// The merged inputs are kept in `merged` (superseded, never deleted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRole {
    pub title: String,
    pub organisation: String,
    pub country: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// "+"-joined sorted unique source label, e.g. "news+wikidata"
    pub source: String,
    pub confidence: f64,
    pub raw_reference: Option<String>,
    pub merged: Vec<DiscoveredRole>,
}

// ============================================================================
// Media
// ============================================================================

/// Sentiment label of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Sentiment {
    /// Score multiplier applied during per-item scoring
    pub fn multiplier(self) -> f64 {
        match self {
            Sentiment::Negative => 1.5,
            Sentiment::Neutral => 1.0,
            Sentiment::Positive => 0.3,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Positive => write!(f, "Positive"),
        }
    }
}

/// Kind of evidence a provider supplies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    #[default]
    AdverseMedia,
    StructuredPep,
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceType::AdverseMedia => write!(f, "adverse_media"),
            EvidenceType::StructuredPep => write!(f, "structured_pep"),
        }
    }
}

/// Why a media item was logically excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// Subject not named among the item's persons
    SubjectNotMentioned,
    /// Entity-link confidence below the media threshold
    WeakEntityLink,
    /// Publisher credibility below the media minimum
    LowCredibility,
    /// Not negative after classification
    NotAdverse,
}

/// One adverse-media candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Publication date, `YYYY-MM-DD`
    pub date: String,
    /// Publisher URL or provider name
    pub source: String,
    pub headline: String,
    #[serde(default)]
    pub excerpt: String,
    /// Raw provider score, 0-100
    pub score: f64,
    #[serde(default, alias = "inferring")]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub credibility_score: Option<f64>,
    #[serde(default)]
    pub entity_link_confidence: Option<f64>,
    #[serde(default)]
    pub entity_link_signals: Vec<String>,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub evidence_type: EvidenceType,
    #[serde(default)]
    pub suppressed: Option<SuppressionReason>,
    /// Classifier reasoning, when a classifier ran
    #[serde(default)]
    pub explanation: Option<String>,
}

impl MediaItem {
    pub fn new(
        date: impl Into<String>,
        source: impl Into<String>,
        headline: impl Into<String>,
        score: f64,
        sentiment: Sentiment,
    ) -> Self {
        Self {
            date: date.into(),
            source: source.into(),
            headline: headline.into(),
            excerpt: String::new(),
            score,
            sentiment,
            persons: Vec::new(),
            organizations: Vec::new(),
            country: String::new(),
            credibility_score: None,
            entity_link_confidence: None,
            entity_link_signals: Vec::new(),
            final_score: None,
            evidence_type: EvidenceType::AdverseMedia,
            suppressed: None,
            explanation: None,
        }
    }

    /// Set the persons named in the item
    pub fn with_persons(mut self, persons: &[&str]) -> Self {
        self.persons = persons.iter().map(|p| p.to_string()).collect();
        self
    }

    /// True when suppression filters have not excluded this item
    pub fn is_active(&self) -> bool {
        self.suppressed.is_none()
    }

    fn validate(&self) -> Result<(), String> {
        if self.headline.trim().is_empty() {
            return Err("media item without headline".to_string());
        }
        if !(self.score.is_finite() && (0.0..=100.0).contains(&self.score)) {
            return Err(format!(
                "media item '{}' score out of range: {}",
                self.headline, self.score
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Provider boundary
// ============================================================================

/// Tagged record emitted by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceRecord {
    Media(MediaItem),
    Role(DiscoveredRole),
    Claim(RawClaim),
}

impl EvidenceRecord {
    /// Structural validation at the provider boundary
    ///
    /// Raw claims are validated later, one by one, by the fusion layer.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            EvidenceRecord::Media(item) => item.validate(),
            EvidenceRecord::Role(role) => role.validate(),
            EvidenceRecord::Claim(_) => Ok(()),
        }
    }
}

/// Provider failure
///
/// Never propagated past the orchestrator: a failing provider contributes
/// zero records.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// I/O error (file read)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// External API error
    #[error("API error: {0}")]
    Api(String),

    /// Provider did not answer in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Response could not be parsed or failed validation
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Provider not configured or disabled
    #[error("Provider not available: {0}")]
    NotAvailable(String),
}

/// Output of identity linking: consumed immediately by the calling decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLinkResult {
    pub confidence: f64,
    /// Signals in fixed evaluation order, for audit
    pub signals: Vec<String>,
}
