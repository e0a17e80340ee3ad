// Screening pipeline integration tests
//
// End-to-end screenings over in-memory providers. No network access; every
// screening runs against a fixed clock.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pep_fusion::classify::{Classification, MediaClassifier};
use pep_fusion::config::EngineConfig;
use pep_fusion::providers::{EvidenceProvider, ProviderOrchestrator, ProviderQuery, StaticProvider};
use pep_fusion::screening::{PepBasis, ScreeningPipeline, ScreeningRequest};
use pep_fusion::scoring::RiskStatus;
use pep_fusion::taxonomy::PepLevel;
use pep_fusion::types::{
    DiscoveredRole, EvidenceRecord, EvidenceType, MediaItem, ProviderError, RawClaim, Sentiment,
    SuppressionReason,
};
use pep_fusion::ScreeningError;
use std::sync::Arc;
use std::time::Duration;

const SUBJECT: &str = "Babajide Sanwo-Olu";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap()
}

/// Provider that always errors
struct BrokenProvider;

#[async_trait]
impl EvidenceProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    fn evidence_type(&self) -> EvidenceType {
        EvidenceType::AdverseMedia
    }

    async fn fetch(&self, _query: &ProviderQuery) -> Result<Vec<EvidenceRecord>, ProviderError> {
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

/// Provider that never answers within the test timeout
struct HangingProvider;

#[async_trait]
impl EvidenceProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    fn evidence_type(&self) -> EvidenceType {
        EvidenceType::AdverseMedia
    }

    async fn fetch(&self, _query: &ProviderQuery) -> Result<Vec<EvidenceRecord>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![media("2026-05-01", "https://www.reuters.com/late", "Late story", 100.0)])
    }
}

/// Classifier failing on headlines containing "unreachable"; otherwise
/// flags "budget" stories as official duties
struct KeywordClassifier;

#[async_trait]
impl MediaClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, _subject: &str, item: &MediaItem) -> Result<Classification, ProviderError> {
        if item.headline.contains("unreachable") {
            return Err(ProviderError::Api("classifier unreachable".to_string()));
        }
        Ok(Classification {
            sentiment: Sentiment::Negative,
            is_adverse_involvement: !item.headline.contains("budget"),
            reasoning: String::new(),
        })
    }
}

fn media(date: &str, source: &str, headline: &str, score: f64) -> EvidenceRecord {
    let mut item = MediaItem::new(date, source, headline, score, Sentiment::Negative).with_persons(&[SUBJECT]);
    item.country = "NG".to_string();
    EvidenceRecord::Media(item)
}

fn governor_roles() -> Vec<EvidenceRecord> {
    vec![
        EvidenceRecord::Role(
            DiscoveredRole::new("Governor of Lagos State", "Lagos State Government", "NG", "wikidata", 0.9)
                .with_years(Some(2019), None),
        ),
        EvidenceRecord::Role(
            DiscoveredRole::new("Commissioner for Finance", "Lagos State Government", "NG", "wikidata", 0.85)
                .with_years(Some(2007), Some(2015)),
        ),
    ]
}

fn pipeline(providers: Vec<Arc<dyn EvidenceProvider>>) -> ScreeningPipeline {
    let mut orchestrator = ProviderOrchestrator::new(Duration::from_millis(200));
    for provider in providers {
        orchestrator.register(provider);
    }
    ScreeningPipeline::new(&EngineConfig::default(), orchestrator)
}

fn static_provider(name: &str, records: Vec<EvidenceRecord>) -> Arc<dyn EvidenceProvider> {
    Arc::new(StaticProvider::new(name, EvidenceType::AdverseMedia, records))
}

#[tokio::test]
async fn blank_query_is_the_only_failure() {
    let result = pipeline(vec![]).screen_at(&ScreeningRequest::new("\t "), now()).await;
    assert!(matches!(result, Err(ScreeningError::EmptyQuery)));
}

#[tokio::test]
async fn sitting_governor_is_level_one_pep() {
    let report = pipeline(vec![static_provider("wikidata", governor_roles())])
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let pep = &report.pep;
    assert!(pep.is_pep);
    assert_eq!(pep.basis, PepBasis::RoleEvidence);
    assert_eq!(pep.pep_level, PepLevel::Level1);
    assert_eq!(pep.matched_role.as_deref(), Some("Governor"));
    assert_eq!(pep.current_positions, vec!["Governor"]);
    assert_eq!(pep.previous_positions, vec!["Commissioner"]);
    assert_eq!(pep.organisation, "Lagos State Government");
    assert!(pep.entity_link.as_ref().unwrap().confidence >= 0.65);
}

#[tokio::test]
async fn weak_roles_are_not_trusted() {
    let roles = vec![EvidenceRecord::Role(
        DiscoveredRole::new("Senator", "", "NG", "news", 0.6).with_years(Some(2023), None),
    )];
    let report = pipeline(vec![static_provider("news", roles)])
        .screen_at(&ScreeningRequest::new(SUBJECT), now())
        .await
        .unwrap();

    assert!(!report.pep.is_pep);
    assert_eq!(report.pep.pep_level, PepLevel::NotPep);
    assert_eq!(report.pep.reasons, vec!["No roles met confidence threshold."]);
}

#[tokio::test]
async fn failing_and_timed_out_providers_contribute_nothing() {
    let report = pipeline(vec![
        Arc::new(BrokenProvider) as Arc<dyn EvidenceProvider>,
        Arc::new(HangingProvider),
        static_provider("wikidata", governor_roles()),
    ])
    .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
    .await
    .unwrap();

    assert!(report.pep.is_pep);
    assert_eq!(report.adverse_media.total, 0);
    assert_eq!(report.providers, vec!["broken", "hanging", "wikidata"]);
}

#[tokio::test]
async fn malformed_claim_does_not_affect_its_group() {
    let claims = vec![
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("IS_PEP".into()),
            claim_value: Some("true".into()),
            source: Some("opensanctions".into()),
            confidence: Some(0.92),
            ..Default::default()
        }),
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("IS_PEP".into()),
            claim_value: Some("false".into()),
            source: Some("blog".into()),
            confidence: None,
            ..Default::default()
        }),
    ];
    let report = pipeline(vec![static_provider("opensanctions", claims)])
        .screen_at(&ScreeningRequest::new(SUBJECT), now())
        .await
        .unwrap();

    assert_eq!(report.claims.len(), 1);
    assert_eq!(report.claims[0].claim_value, "true");
    assert_eq!(report.claims[0].confidence, 0.92);
    assert!(report.pep.is_pep);
    assert_eq!(report.pep.basis, PepBasis::StructuredEvidence);
    assert_eq!(report.pep.pep_level, PepLevel::Unclassified);
}

#[tokio::test]
async fn suppressed_media_is_retained_but_not_scored() {
    let mut other_person = MediaItem::new(
        "2026-05-10",
        "https://www.reuters.com/other",
        "Babajide Sanwo-Olu aide arrested",
        95.0,
        Sentiment::Negative,
    )
    .with_persons(&["Tunde Bakare"]);
    other_person.country = "NG".to_string();

    let records = vec![
        media("2026-05-01", "https://www.reuters.com/probe", "Probe into land deal", 50.0),
        EvidenceRecord::Media(other_person),
    ];
    let report = pipeline(vec![static_provider("news-feed", records)])
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let summary = &report.adverse_media;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.suppressed, 1);
    assert_eq!(summary.media[1].final_score, None);
    assert!(summary.media[1].suppressed.is_some());
    // 50 * 0.95 * 1.5 * 1.0
    assert_eq!(summary.weighted_score, 71.25);
    assert_eq!(summary.status, RiskStatus::MediumRisk);
}

#[tokio::test]
async fn classifier_failure_degrades_only_that_item() {
    let records = vec![
        media("2026-05-01", "https://www.reuters.com/a", "Assets frozen", 60.0),
        media("2026-05-02", "https://www.reuters.com/b", "Story unreachable", 60.0),
        media("2026-05-03", "https://www.reuters.com/c", "Governor presents budget", 60.0),
    ];
    let report = pipeline(vec![static_provider("news-feed", records)])
        .with_classifier(Arc::new(KeywordClassifier))
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let media = &report.adverse_media.media;
    assert_eq!(media[0].sentiment, Sentiment::Negative);
    assert!(media[0].is_active());
    assert_eq!(media[1].sentiment, Sentiment::Neutral);
    assert_eq!(media[1].suppressed, Some(SuppressionReason::NotAdverse));
    assert_eq!(media[2].sentiment, Sentiment::Neutral);
    assert_eq!(report.adverse_media.active, 1);
}

#[tokio::test]
async fn every_stage_is_audited() {
    let report = pipeline(vec![static_provider("wikidata", governor_roles())])
        .screen_at(&ScreeningRequest::new(SUBJECT), now())
        .await
        .unwrap();

    assert_eq!(report.screened_at, now());
    assert_eq!(report.audit.created_at, now());
    assert_eq!(
        report.audit.event_types(),
        vec![
            "screening_started",
            "evidence_fetched",
            "claims_resolved",
            "roles_resolved",
            "pep_determined",
            "media_scored",
        ]
    );
    assert_eq!(report.audit.events[1].payload["roles"], 2);
}

#[tokio::test]
async fn report_serializes_with_labels() {
    let report = pipeline(vec![static_provider("wikidata", governor_roles())])
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pep"]["pep_level"], "High Risk (Level 1)");
    assert_eq!(json["adverse_media"]["status"], "Clear");
    assert_eq!(json["pep"]["basis"], "role_evidence");
}

#[tokio::test]
async fn registry_confirmation_beats_unrelated_trusted_roles() {
    let records = vec![
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("IS_PEP".into()),
            claim_value: Some("true".into()),
            source: Some("opensanctions".into()),
            confidence: Some(0.95),
            ..Default::default()
        }),
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("PEP_ROLE".into()),
            claim_value: Some("Minister of Finance".into()),
            source: Some("opensanctions".into()),
            confidence: Some(0.9),
            ..Default::default()
        }),
        EvidenceRecord::Role(
            DiscoveredRole::new("Chairman", "Acme Ltd", "NG", "wikidata", 0.9).with_years(Some(2020), None),
        ),
    ];
    let report = pipeline(vec![static_provider("opensanctions", records)])
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let pep = &report.pep;
    assert!(pep.is_pep);
    assert_eq!(pep.basis, PepBasis::StructuredEvidence);
    assert_eq!(pep.pep_level, PepLevel::Level1);
    assert_eq!(pep.matched_role.as_deref(), Some("Minister"));
    assert_eq!(pep.current_positions, vec!["Minister"]);
}

#[tokio::test]
async fn structured_positions_keep_one_current_title() {
    let role_claim = |title: &str, confidence: f64| {
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("PEP_ROLE".into()),
            claim_value: Some(title.into()),
            source: Some("opensanctions".into()),
            confidence: Some(confidence),
            ..Default::default()
        })
    };
    let records = vec![
        EvidenceRecord::Claim(RawClaim {
            claim_type: Some("IS_PEP".into()),
            claim_value: Some("true".into()),
            source: Some("opensanctions".into()),
            confidence: Some(0.95),
            ..Default::default()
        }),
        role_claim("Commissioner for Finance", 0.6),
        role_claim("Senator", 0.92),
        role_claim("Minister of Works", 0.7),
    ];
    let report = pipeline(vec![static_provider("opensanctions", records)])
        .screen_at(&ScreeningRequest::new(SUBJECT), now())
        .await
        .unwrap();

    let pep = &report.pep;
    assert_eq!(pep.basis, PepBasis::StructuredEvidence);
    assert_eq!(pep.current_positions, vec!["Senator"]);
    assert_eq!(pep.previous_positions, vec!["Minister", "Commissioner"]);
    assert_eq!(pep.pep_level, PepLevel::Level1);
}

#[tokio::test]
async fn media_without_country_cannot_reach_link_threshold() {
    // Name and credibility alone top out below the 0.6 media threshold
    let item = MediaItem::new(
        "2026-05-01",
        "https://www.reuters.com/untagged",
        "Babajide Sanwo-Olu named in fraud case",
        90.0,
        Sentiment::Negative,
    )
    .with_persons(&[SUBJECT]);
    let report = pipeline(vec![static_provider("news-feed", vec![EvidenceRecord::Media(item)])])
        .screen_at(&ScreeningRequest::new(SUBJECT), now())
        .await
        .unwrap();

    let media = &report.adverse_media.media[0];
    assert!(media.entity_link_confidence.unwrap() < 0.6);
    assert_eq!(media.suppressed, Some(SuppressionReason::WeakEntityLink));
    assert_eq!(report.adverse_media.active, 0);
    assert_eq!(report.adverse_media.status, RiskStatus::Clear);
}

#[tokio::test]
async fn low_credibility_publisher_is_suppressed() {
    let mut blog = MediaItem::new(
        "2026-05-02",
        "https://naija-gist.example/story",
        "Babajide Sanwo-Olu linked to contract scandal",
        95.0,
        Sentiment::Negative,
    )
    .with_persons(&[SUBJECT]);
    blog.country = "NG".to_string();
    blog.organizations = vec!["Lagos State Government".to_string()];

    let mut records = governor_roles();
    records.push(media("2026-05-01", "https://www.reuters.com/probe", "Probe into land deal", 50.0));
    records.push(EvidenceRecord::Media(blog));

    let report = pipeline(vec![static_provider("mixed", records)])
        .screen_at(&ScreeningRequest::new(SUBJECT).with_country("NG"), now())
        .await
        .unwrap();

    let media = &report.adverse_media.media;
    assert!(media[0].is_active());
    assert!(media[1].entity_link_confidence.unwrap() >= 0.6);
    assert_eq!(media[1].credibility_score, Some(0.5));
    assert_eq!(media[1].suppressed, Some(SuppressionReason::LowCredibility));
    assert_eq!(media[1].final_score, None);
    assert_eq!(report.adverse_media.active, 1);
}
