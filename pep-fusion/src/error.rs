//! Screening errors
//!
//! Only a blank query and startup misconfiguration fail a screening. Provider
//! failures, malformed claims and threshold rejections degrade the result
//! instead (see `ProviderError`, `FusionInputError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    /// Query name is empty or whitespace
    #[error("Query name must not be blank")]
    EmptyQuery,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] pep_common::Error),
}

pub type Result<T> = std::result::Result<T, ScreeningError>;
