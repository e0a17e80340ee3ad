// Screening Pipeline - end-to-end PEP and adverse-media determination
//
// Stages:
// 1. Reject a blank query; open the audit trace
// 2. Fetch evidence from every provider concurrently
// 3. Claims: validate → fuse → resolve boolean contradictions
// 4. Roles: holder disambiguation → normalize → decay/boost → aggregate →
//    trust filter → current/previous split → entity link → taxonomy
// 5. Media: entity link → classify → suppress → score → weighted score → band
// 6. Assemble the report
//
// Threshold failures produce a negative determination with a reason, never
// an error.

use crate::audit::AuditTrace;
use crate::classify::{classify_all, MediaClassifier};
use crate::config::{CredibilityTable, EngineConfig, SourceWeightTable, Thresholds};
use crate::entity::{name_similarity, Disambiguator, EntityLinker, LinkInput};
use crate::error::{Result, ScreeningError};
use crate::fusion::{ConflictResolver, EvidenceFusionEngine, RoleAggregator};
use crate::normalize::ClaimNormalizer;
use crate::providers::{ProviderOrchestrator, ProviderOutput};
use crate::roles::{trusted, RoleResolver, RoleSplit};
use crate::scoring::{
    derive_risk_status, RiskAggregator, RiskStatus, SuppressionFilter, TemporalDecayScorer,
};
use crate::taxonomy::{PepLevel, PepTaxonomy};
use crate::types::{
    Claim, ClaimType, DiscoveredRole, EntityLinkResult, EvidenceRecord, EvidenceType, MediaItem,
    RawClaim, ResolvedClaim, ResolvedRole, SuppressionReason,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Screening input
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningRequest {
    pub name: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScreeningRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Restrict media to a publication window
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    fn country_or_empty(&self) -> &str {
        self.country.as_deref().map(str::trim).unwrap_or("")
    }
}

/// How a PEP determination was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PepBasis {
    /// Resolved IS_PEP claim from structured sources
    StructuredEvidence,
    /// Trusted roles, identity link and taxonomy
    RoleEvidence,
    /// No positive determination
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct PepDetermination {
    pub is_pep: bool,
    pub pep_level: PepLevel,
    pub matched_role: Option<String>,
    pub basis: PepBasis,
    pub current_positions: Vec<String>,
    pub previous_positions: Vec<String>,
    pub organisation: String,
    pub entity_link: Option<EntityLinkResult>,
    /// Roles that passed the trust threshold
    pub roles: Vec<ResolvedRole>,
    pub reasons: Vec<String>,
}

impl PepDetermination {
    fn not_pep(reason: impl Into<String>) -> Self {
        Self {
            is_pep: false,
            pep_level: PepLevel::NotPep,
            matched_role: None,
            basis: PepBasis::None,
            current_positions: Vec::new(),
            previous_positions: Vec::new(),
            organisation: String::new(),
            entity_link: None,
            roles: Vec::new(),
            reasons: vec![reason.into()],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdverseMediaSummary {
    pub total: usize,
    pub active: usize,
    pub suppressed: usize,
    pub weighted_score: f64,
    pub status: RiskStatus,
    /// Every fetched item, suppressed ones included
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub query: String,
    pub country: Option<String>,
    pub screened_at: DateTime<Utc>,
    pub providers: Vec<String>,
    pub pep: PepDetermination,
    pub adverse_media: AdverseMediaSummary,
    pub claims: Vec<ResolvedClaim>,
    pub audit: AuditTrace,
}

/// Evidence split by record kind
#[derive(Default)]
struct Evidence {
    media: Vec<MediaItem>,
    roles: Vec<DiscoveredRole>,
    claims: Vec<RawClaim>,
}

impl Evidence {
    fn from_outputs(outputs: Vec<ProviderOutput>) -> Self {
        let mut evidence = Self::default();
        for output in outputs {
            match output.record {
                EvidenceRecord::Media(item) => evidence.media.push(item),
                EvidenceRecord::Role(role) => evidence.roles.push(role),
                EvidenceRecord::Claim(claim) => evidence.claims.push(claim),
            }
        }
        evidence
    }
}

pub struct ScreeningPipeline {
    orchestrator: ProviderOrchestrator,
    classifier: Option<Arc<dyn MediaClassifier>>,
    weights: SourceWeightTable,
    credibility: CredibilityTable,
    thresholds: Thresholds,
    normalizer: ClaimNormalizer,
    fusion: EvidenceFusionEngine,
    conflicts: ConflictResolver,
    aggregator: RoleAggregator,
    role_resolver: RoleResolver,
    disambiguator: Disambiguator,
    linker: EntityLinker,
    media_linker: EntityLinker,
    suppression: SuppressionFilter,
    taxonomy: PepTaxonomy,
}

impl ScreeningPipeline {
    /// Build the pipeline from configuration and a populated orchestrator
    pub fn new(config: &EngineConfig, orchestrator: ProviderOrchestrator) -> Self {
        let weights = config.source_weight_table();
        let thresholds = config.thresholds.clone();

        Self {
            orchestrator,
            classifier: None,
            aggregator: RoleAggregator::new(weights.clone()),
            weights,
            credibility: config.credibility_table(),
            normalizer: ClaimNormalizer::new(),
            fusion: EvidenceFusionEngine::new(),
            conflicts: ConflictResolver::new(),
            role_resolver: RoleResolver::new(config.role_priority_table()),
            disambiguator: Disambiguator::new(thresholds.disambiguation_match),
            linker: EntityLinker::new(thresholds.entity_link_accept),
            media_linker: EntityLinker::new(thresholds.media_link_accept),
            suppression: SuppressionFilter::new(thresholds.media_link_accept, thresholds.media_min_credibility),
            taxonomy: PepTaxonomy::default(),
            thresholds,
        }
    }

    /// Enable the media classification stage
    pub fn with_classifier(mut self, classifier: Arc<dyn MediaClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn orchestrator(&self) -> &ProviderOrchestrator {
        &self.orchestrator
    }

    /// Screen a subject against the current clock
    pub async fn screen(&self, request: &ScreeningRequest) -> Result<ScreeningReport> {
        self.screen_at(request, pep_common::time::now()).await
    }

    /// Screen a subject as of `now` (clock read once per screening)
    pub async fn screen_at(
        &self,
        request: &ScreeningRequest,
        now: DateTime<Utc>,
    ) -> Result<ScreeningReport> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ScreeningError::EmptyQuery);
        }
        let country = request.country_or_empty();

        let mut trace = AuditTrace::new(now);
        trace.add_event(
            "screening_started",
            json!({
                "query": name,
                "country": country,
                "start_date": request.start_date,
                "end_date": request.end_date,
            }),
        );
        info!(query = name, country, "Screening started");

        // Stage 2: evidence
        let outputs = self
            .orchestrator
            .fetch_all(name, Some(country), request.start_date, request.end_date)
            .await?;
        let evidence = Evidence::from_outputs(outputs);
        trace.add_event(
            "evidence_fetched",
            json!({
                "providers": self.orchestrator.names(),
                "media": evidence.media.len(),
                "roles": evidence.roles.len(),
                "claims": evidence.claims.len(),
            }),
        );

        // Stage 3: claims
        let claims = self.resolve_claims(evidence.claims, now, &mut trace);

        // Stage 4: PEP determination
        let pep = self.determine_pep(name, country, evidence.roles, &claims, now, &mut trace);

        // Stage 5: adverse media
        let adverse_media = self
            .assess_media(name, country, &pep, evidence.media, now.date_naive(), &mut trace)
            .await;

        info!(
            query = name,
            is_pep = pep.is_pep,
            pep_level = %pep.pep_level,
            media_score = adverse_media.weighted_score,
            status = %adverse_media.status,
            "Screening complete"
        );

        Ok(ScreeningReport {
            query: name.to_string(),
            country: request.country.clone(),
            screened_at: now,
            providers: self.orchestrator.names(),
            pep,
            adverse_media,
            claims,
            audit: trace,
        })
    }

    fn resolve_claims(
        &self,
        raw: Vec<RawClaim>,
        now: DateTime<Utc>,
        trace: &mut AuditTrace,
    ) -> Vec<ResolvedClaim> {
        let received = raw.len();
        let mut dropped = Vec::new();
        let claims: Vec<Claim> = raw
            .into_iter()
            .filter_map(|raw| match raw.into_claim(&self.weights, now) {
                Ok(claim) => Some(claim),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed claim");
                    dropped.push(e.to_string());
                    None
                }
            })
            .collect();

        let resolved = self.conflicts.resolve(self.fusion.resolve(&claims));

        trace.add_event(
            "claims_resolved",
            json!({
                "received": received,
                "dropped": dropped,
                "resolved": resolved
                    .iter()
                    .map(|c| json!({
                        "claim_type": c.claim_type.key(),
                        "claim_value": c.claim_value,
                        "confidence": c.confidence,
                        "sources": c.sources,
                    }))
                    .collect::<Vec<_>>(),
            }),
        );

        resolved
    }

    fn determine_pep(
        &self,
        name: &str,
        country: &str,
        roles: Vec<DiscoveredRole>,
        claims: &[ResolvedClaim],
        now: DateTime<Utc>,
        trace: &mut AuditTrace,
    ) -> PepDetermination {
        let current_year = now.year();
        let decay = TemporalDecayScorer::new(now.date_naive());
        let discovered = roles.len();

        // Early reject: roles explicitly attached to someone else
        let mut rejected_holders = 0;
        let mut roles: Vec<DiscoveredRole> = roles
            .into_iter()
            .filter(|role| match role.holder.as_deref() {
                Some(holder) if !holder.trim().is_empty() => {
                    let role_country = if role.country.trim().is_empty() { country } else { role.country.as_str() };
                    let query_country = if country.is_empty() { role_country } else { country };
                    let verdict = self.disambiguator.disambiguate(name, holder, query_country, role_country);
                    if !verdict.is_match {
                        debug!(holder, title = %role.title, reasons = ?verdict.reasons, "Role holder rejected");
                        rejected_holders += 1;
                    }
                    verdict.is_match
                }
                _ => true,
            })
            .collect();

        for role in &mut roles {
            role.title = self.normalizer.normalize_title(&role.title);
            role.organisation = self.normalizer.normalize_org(&role.organisation);
            decay.adjust_role(role, current_year);
        }

        let aggregated = self.aggregator.aggregate(&roles);
        let trusted_roles = trusted(&aggregated, self.thresholds.trusted_role_confidence);

        trace.add_event(
            "roles_resolved",
            json!({
                "discovered": discovered,
                "rejected_holders": rejected_holders,
                "aggregated": aggregated.len(),
                "trusted": trusted_roles
                    .iter()
                    .map(|r| json!({"title": r.title, "source": r.source, "confidence": r.confidence}))
                    .collect::<Vec<_>>(),
            }),
        );

        // Structured confirmation wins over role evidence
        let determination = if let Some(structured) = self.structured_gate(claims) {
            structured
        } else if trusted_roles.is_empty() {
            PepDetermination::not_pep(if roles.is_empty() {
                "No public roles discovered."
            } else {
                "No roles met confidence threshold."
            })
        } else {
            self.determine_from_roles(name, country, trusted_roles, current_year)
        };

        trace.add_event(
            "pep_determined",
            json!({
                "is_pep": determination.is_pep,
                "pep_level": determination.pep_level.label(),
                "basis": determination.basis,
                "reasons": determination.reasons,
            }),
        );

        determination
    }

    /// Structured gate: resolved IS_PEP true at or above the configured confidence
    fn structured_gate(&self, claims: &[ResolvedClaim]) -> Option<PepDetermination> {
        let confirmation = claims.iter().find(|c| {
            c.claim_type == ClaimType::IsPep
                && c.claim_value == "true"
                && c.confidence >= self.thresholds.structured_pep_confidence
        })?;

        let mut role_claims: Vec<&ResolvedClaim> =
            claims.iter().filter(|c| c.claim_type == ClaimType::PepRole).collect();
        role_claims.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut positions: Vec<String> = Vec::new();
        for claim in &role_claims {
            let title = self.normalizer.normalize_title(&claim.claim_value);
            if !positions.contains(&title) {
                positions.push(title);
            }
        }
        let taxonomy = self.taxonomy.classify(&positions);

        // Highest-confidence title is current, the rest are previous
        let previous_positions = if positions.len() > 1 { positions.split_off(1) } else { Vec::new() };
        let pep_level = if taxonomy.pep_level.is_pep() {
            taxonomy.pep_level
        } else {
            PepLevel::Unclassified
        };

        let mut reasons = vec![format!(
            "{} confirm public office (confidence {:.2}).",
            confirmation.sources.join(", "),
            confirmation.confidence
        )];
        reasons.extend(
            role_claims
                .iter()
                .map(|c| format!("{} reported by {} (confidence {:.2}).", c.claim_value, c.sources.join(", "), c.confidence)),
        );

        Some(PepDetermination {
            is_pep: true,
            pep_level,
            matched_role: taxonomy.matched_role,
            basis: PepBasis::StructuredEvidence,
            current_positions: positions,
            previous_positions,
            organisation: String::new(),
            entity_link: None,
            roles: Vec::new(),
            reasons,
        })
    }

    fn determine_from_roles(
        &self,
        name: &str,
        country: &str,
        trusted_roles: Vec<ResolvedRole>,
        current_year: i32,
    ) -> PepDetermination {
        let RoleSplit { current, previous } = self.role_resolver.split(&trusted_roles, current_year);

        // Highest confidence, first on ties
        let mut primary = &trusted_roles[0];
        for role in &trusted_roles[1..] {
            if role.confidence > primary.confidence {
                primary = role;
            }
        }

        let held: Vec<String> = current.iter().chain(previous.iter()).cloned().collect();
        let evidenced: Vec<String> = trusted_roles.iter().map(|r| r.title.clone()).collect();
        let candidate_name = primary
            .merged
            .iter()
            .find_map(|r| r.holder.as_deref())
            .unwrap_or(name);
        let candidate_country = if primary.country.trim().is_empty() { country } else { primary.country.as_str() };
        let credibility = primary
            .merged
            .iter()
            .map(|r| self.weights.weight(&r.source))
            .fold(0.0_f64, f64::max);

        let link = self.linker.link(
            &LinkInput::new(name, candidate_name)
                .countries(country, candidate_country)
                .positions(&held, &evidenced)
                .organisations(&primary.organisation, &primary.organisation)
                .source_credibility(credibility),
        );

        if !self.linker.accepts(&link) {
            debug!(confidence = link.confidence, signals = ?link.signals, "Entity link rejected");
            let mut rejected = PepDetermination::not_pep("Entity linking confidence too low.");
            rejected.entity_link = Some(link);
            return rejected;
        }

        // Former office holders stay PEPs when no current role classifies
        let mut taxonomy = self.taxonomy.classify(&current);
        if !taxonomy.pep_level.is_pep() {
            taxonomy = self.taxonomy.classify(&previous);
        }
        if !taxonomy.pep_level.is_pep() {
            let mut rejected = PepDetermination::not_pep("Roles do not meet PEP taxonomy criteria.");
            rejected.entity_link = Some(link);
            return rejected;
        }

        let reasons = trusted_roles
            .iter()
            .map(|r| {
                let org = if r.organisation.is_empty() {
                    String::new()
                } else {
                    format!(" at {}", r.organisation)
                };
                format!(
                    "{}{} corroborated by {} (confidence {:.2}).",
                    r.title, org, r.source, r.confidence
                )
            })
            .chain(std::iter::once(format!(
                "Identity linked with confidence {:.2} ({}).",
                link.confidence,
                link.signals.join("; ")
            )))
            .collect();

        PepDetermination {
            is_pep: true,
            pep_level: taxonomy.pep_level,
            matched_role: taxonomy.matched_role,
            basis: PepBasis::RoleEvidence,
            current_positions: current,
            previous_positions: previous,
            organisation: primary.organisation.clone(),
            entity_link: Some(link),
            roles: trusted_roles.clone(),
            reasons,
        }
    }

    async fn assess_media(
        &self,
        name: &str,
        country: &str,
        pep: &PepDetermination,
        mut media: Vec<MediaItem>,
        today: NaiveDate,
        trace: &mut AuditTrace,
    ) -> AdverseMediaSummary {
        let risk = RiskAggregator::new(self.credibility.clone(), TemporalDecayScorer::new(today));

        for item in media
            .iter_mut()
            .filter(|i| i.evidence_type == EvidenceType::AdverseMedia)
        {
            self.link_media_item(name, country, pep, &risk, item);
        }

        let mut classification_failures = 0;
        if let Some(classifier) = &self.classifier {
            classification_failures = classify_all(classifier.as_ref(), name, &mut media).await;
        }

        self.suppression.apply(name, &mut media);
        risk.score_all(&mut media);

        let weighted_score = RiskAggregator::calculate_weighted_score(&media);
        let status = derive_risk_status(weighted_score);
        let active = media.iter().filter(|i| i.is_active()).count();

        trace.add_event(
            "media_scored",
            json!({
                "total": media.len(),
                "active": active,
                "classification_failures": classification_failures,
                "weighted_score": weighted_score,
                "status": status.as_str(),
            }),
        );

        AdverseMediaSummary {
            total: media.len(),
            active,
            suppressed: media.len() - active,
            weighted_score,
            status,
            media,
        }
    }

    /// Entity-link one adverse item against the subject, suppressing weak links
    fn link_media_item(
        &self,
        name: &str,
        country: &str,
        pep: &PepDetermination,
        risk: &RiskAggregator,
        item: &mut MediaItem,
    ) {
        // Best-matching named person
        let Some(person) = item
            .persons
            .iter()
            .max_by(|a, b| name_similarity(name, a).total_cmp(&name_similarity(name, b)))
            .cloned()
        else {
            item.suppressed = Some(SuppressionReason::SubjectNotMentioned);
            return;
        };

        let pep_org = self.normalizer.normalize_key(&pep.organisation);
        let candidate_org = item
            .organizations
            .iter()
            .find(|o| !pep_org.is_empty() && self.normalizer.normalize_key(o) == pep_org)
            .map(String::as_str)
            .unwrap_or("");

        let credibility = risk.credibility_for(item);
        item.credibility_score = Some(credibility);
        let link = self.media_linker.link(
            &LinkInput::new(name, &person)
                .countries(country, &item.country)
                .organisations(&pep.organisation, candidate_org)
                .source_credibility(credibility),
        );

        let accepted = self.media_linker.accepts(&link);
        item.entity_link_confidence = Some(link.confidence);
        item.entity_link_signals = link.signals;
        if !accepted {
            item.suppressed = Some(SuppressionReason::WeakEntityLink);
        }
    }
}
