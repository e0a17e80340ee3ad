//! # PEP Common Library
//!
//! Shared code for the PEP screening workspace including:
//! - Error types
//! - TOML configuration loading and config file resolution
//! - Date and timestamp helpers used by the scoring layers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
