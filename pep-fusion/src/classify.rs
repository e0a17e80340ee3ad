//! Adverse-media classification stage
//!
//! A classifier (typically a language-model service) separates reporting on a
//! subject's official duties from actual adverse involvement. Items are
//! classified concurrently; a failing call degrades only its own item to
//! Neutral.

use crate::types::{EvidenceType, MediaItem, ProviderError, Sentiment};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Classifier verdict for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    /// False when the item reports official duties rather than wrongdoing
    pub is_adverse_involvement: bool,
    #[serde(default)]
    pub reasoning: String,
}

#[async_trait::async_trait]
pub trait MediaClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, subject: &str, item: &MediaItem) -> Result<Classification, ProviderError>;
}

/// Classify every active adverse-media item in place
///
/// Structured PEP items and suppressed items are skipped. Returns the number
/// of items whose classification failed.
pub async fn classify_all(
    classifier: &dyn MediaClassifier,
    subject: &str,
    items: &mut [MediaItem],
) -> usize {
    let eligible = |item: &MediaItem| {
        item.evidence_type != EvidenceType::StructuredPep && item.is_active()
    };

    let verdicts = join_all(items.iter().map(|item| async move {
        if eligible(item) {
            Some(classifier.classify(subject, item).await)
        } else {
            None
        }
    }))
    .await;

    let mut failures = 0;
    for (item, verdict) in items.iter_mut().zip(verdicts) {
        match verdict {
            None => {}
            Some(Ok(classification)) => apply(item, classification),
            Some(Err(e)) => {
                warn!(
                    classifier = classifier.name(),
                    headline = %item.headline,
                    error = %e,
                    "Classification failed, defaulting to Neutral"
                );
                item.sentiment = Sentiment::Neutral;
                failures += 1;
            }
        }
    }

    info!(
        classifier = classifier.name(),
        items = items.len(),
        failures,
        "Media classification complete"
    );

    failures
}

fn apply(item: &mut MediaItem, classification: Classification) {
    let mut sentiment = classification.sentiment;
    if !classification.is_adverse_involvement && sentiment == Sentiment::Negative {
        sentiment = Sentiment::Neutral;
    }

    debug!(
        headline = %item.headline,
        from = %item.sentiment,
        to = %sentiment,
        "Applied classification"
    );

    item.sentiment = sentiment;
    if !classification.reasoning.is_empty() {
        item.explanation = Some(classification.reasoning);
    }
}
