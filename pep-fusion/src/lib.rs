//! pep-fusion library interface
//!
//! PEP and adverse-media evidence fusion: providers feed claims, roles and
//! media items into a pipeline that fuses them into a PEP determination and
//! a credibility-weighted adverse-media risk score.

pub mod audit;
pub mod classify;
pub mod config;
pub mod entity;
pub mod error;
pub mod fusion;
pub mod normalize;
pub mod providers;
pub mod roles;
pub mod scoring;
pub mod screening;
pub mod taxonomy;
pub mod types;

pub use crate::config::EngineConfig;
pub use crate::error::{Result, ScreeningError};
pub use crate::providers::{EvidenceProvider, ProviderOrchestrator, StaticProvider};
pub use crate::screening::{ScreeningPipeline, ScreeningReport, ScreeningRequest};
