// Scoring Module - adverse-media scoring and risk banding
//
// Flow: suppression (mark, never delete) → per-item score → weighted
// aggregate → risk band. All functions take `today` through
// `TemporalDecayScorer` so results are reproducible.

pub mod decay;
pub mod risk;
pub mod suppression;

pub use decay::{news_role_decay, recency_decay, TemporalDecayScorer};
pub use risk::{derive_risk_status, RiskAggregator, RiskStatus};
pub use suppression::SuppressionFilter;
