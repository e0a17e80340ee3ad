//! Evidence providers and concurrent fan-out
//!
//! Every source (registry, knowledge graph, news feed, sanctions list,
//! language assistant) sits behind the [`EvidenceProvider`] trait. The
//! [`ProviderOrchestrator`] queries all of them concurrently and isolates
//! failures: an erroring, timed-out or malformed provider contributes zero
//! records and a warning, never an error.

pub mod static_provider;

pub use static_provider::StaticProvider;

use crate::error::{Result, ScreeningError};
use crate::types::{EvidenceRecord, EvidenceType, ProviderError};
use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default per-provider timeout
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Query handed to every provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderQuery {
    /// Subject name, trimmed, never blank
    pub name: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProviderQuery {
    /// True when `date` (`YYYY-MM-DD`) lies inside the query window
    ///
    /// Unparseable dates are kept.
    pub fn in_window(&self, date: &str) -> bool {
        match pep_common::time::parse_date(date) {
            Some(d) => {
                self.start_date.map_or(true, |start| d >= start)
                    && self.end_date.map_or(true, |end| d <= end)
            }
            None => true,
        }
    }
}

/// Evidence source capability
///
/// # Example
/// ```rust,ignore
/// use pep_fusion::providers::{EvidenceProvider, ProviderQuery};
///
/// struct SanctionsApi { client: Client }
///
/// #[async_trait::async_trait]
/// impl EvidenceProvider for SanctionsApi {
///     fn name(&self) -> &str { "opensanctions" }
///     fn evidence_type(&self) -> EvidenceType { EvidenceType::StructuredPep }
///
///     async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<EvidenceRecord>, ProviderError> {
///         let hits = self.client.search(&query.name).await?;
///         Ok(hits.into_iter().map(EvidenceRecord::from).collect())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait EvidenceProvider: Send + Sync {
    /// Unique provider name, used for provenance and registration
    fn name(&self) -> &str;

    /// Kind of evidence this provider supplies; stamped onto its media items
    fn evidence_type(&self) -> EvidenceType;

    /// Credibility for items whose publisher is not in the credibility table
    fn default_credibility(&self) -> f64 {
        0.5
    }

    /// Fetch evidence for the query
    ///
    /// # Errors
    /// Any `ProviderError`; the orchestrator logs it and moves on.
    async fn fetch(&self, query: &ProviderQuery) -> std::result::Result<Vec<EvidenceRecord>, ProviderError>;
}

/// One record with the provider that produced it
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    pub provider: String,
    pub evidence_type: EvidenceType,
    pub record: EvidenceRecord,
}

/// Concurrent fan-out over registered providers
pub struct ProviderOrchestrator {
    providers: Vec<Arc<dyn EvidenceProvider>>,
    timeout: Duration,
}

impl Default for ProviderOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER_TIMEOUT)
    }
}

impl ProviderOrchestrator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Register a provider; a duplicate name is a no-op returning `false`
    pub fn register(&mut self, provider: Arc<dyn EvidenceProvider>) -> bool {
        if self.providers.iter().any(|p| p.name() == provider.name()) {
            warn!(provider = provider.name(), "Provider already registered, ignoring");
            return false;
        }
        info!(
            provider = provider.name(),
            evidence_type = %provider.evidence_type(),
            "Registered evidence provider"
        );
        self.providers.push(provider);
        true
    }

    pub fn count(&self) -> usize {
        self.providers.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Query every provider concurrently
    ///
    /// Output order is unspecified. A blank query is the only error.
    pub async fn fetch_all(
        &self,
        query: &str,
        country: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<ProviderOutput>> {
        let name = query.trim();
        if name.is_empty() {
            return Err(ScreeningError::EmptyQuery);
        }

        let query = ProviderQuery {
            name: name.to_string(),
            country: country
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            start_date,
            end_date,
        };

        Ok(self.fetch(&query).await)
    }

    /// Query every provider concurrently with a prepared query
    ///
    /// Each provider runs in its own task; a panicking provider is logged and
    /// contributes no records.
    pub async fn fetch(&self, query: &ProviderQuery) -> Vec<ProviderOutput> {
        let handles: Vec<(String, JoinHandle<Vec<ProviderOutput>>)> = self
            .providers
            .iter()
            .map(|provider| {
                let name = provider.name().to_string();
                let provider = Arc::clone(provider);
                let query = query.clone();
                let timeout = self.timeout;
                let handle = tokio::spawn(async move { fetch_one(provider, query, timeout).await });
                (name, handle)
            })
            .collect();

        let names: Vec<String> = handles.iter().map(|(name, _)| name.clone()).collect();
        let results = join_all(handles.into_iter().map(|(_, handle)| handle)).await;

        let mut outputs = Vec::new();
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(records) => outputs.extend(records),
                Err(e) => warn!(
                    provider = %name,
                    error = %e,
                    "Provider task aborted (contributes no evidence)"
                ),
            }
        }

        info!(
            providers = self.providers.len(),
            records = outputs.len(),
            "Evidence fetch complete"
        );

        outputs
    }
}

/// Fetch from one provider under `timeout`, isolating its failure
async fn fetch_one(
    provider: Arc<dyn EvidenceProvider>,
    query: ProviderQuery,
    timeout: Duration,
) -> Vec<ProviderOutput> {
    let name = provider.name().to_string();
    let outcome = match tokio::time::timeout(timeout, provider.fetch(&query)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    };

    match outcome.and_then(|records| tag_records(provider.as_ref(), records)) {
        Ok(outputs) => {
            debug!(provider = %name, records = outputs.len(), "Provider fetch successful");
            outputs
        }
        Err(e) => {
            warn!(
                provider = %name,
                error = %e,
                "Provider fetch failed (contributes no evidence)"
            );
            Vec::new()
        }
    }
}

/// Validate a batch and stamp provenance onto it
///
/// One invalid record rejects the whole batch.
fn tag_records(
    provider: &dyn EvidenceProvider,
    records: Vec<EvidenceRecord>,
) -> std::result::Result<Vec<ProviderOutput>, ProviderError> {
    if let Some(reason) = records.iter().find_map(|r| r.validate().err()) {
        return Err(ProviderError::Malformed(reason));
    }

    let evidence_type = provider.evidence_type();
    let default_credibility = provider.default_credibility();

    Ok(records
        .into_iter()
        .map(|mut record| {
            if let EvidenceRecord::Media(item) = &mut record {
                item.evidence_type = evidence_type;
                if item.credibility_score.is_none() {
                    item.credibility_score = Some(default_credibility);
                }
            }
            ProviderOutput {
                provider: provider.name().to_string(),
                evidence_type,
                record,
            }
        })
        .collect())
}

// ============================================================================
// Mock Provider for Testing
// ============================================================================


// ============================================================================
// Tests
// ============================================================================
