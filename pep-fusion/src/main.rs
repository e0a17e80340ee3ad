//! pep-fusion - PEP and adverse-media screening
//!
//! Loads the engine config, registers a static provider per `[[providers]]`
//! entry, screens one subject and prints the report as JSON on stdout.
//! Logs go to stderr (or the configured log file).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use pep_common::config::{load_or_default, ConfigFileResolver, LoggingConfig};
use pep_fusion::{
    EngineConfig, ProviderOrchestrator, ScreeningPipeline, ScreeningRequest, StaticProvider,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pep-fusion", version, about = "Screen a person for PEP status and adverse media")]
struct Args {
    /// Full name of the subject
    #[arg(long)]
    name: String,

    /// Country of the subject (e.g. NG)
    #[arg(long)]
    country: Option<String>,

    /// Earliest media publication date (YYYY-MM-DD)
    #[arg(long = "from")]
    start_date: Option<NaiveDate>,

    /// Latest media publication date (YYYY-MM-DD)
    #[arg(long = "to")]
    end_date: Option<NaiveDate>,

    /// Config file (overrides PEP_FUSION_CONFIG)
    #[arg(long, env = "PEP_FUSION_CONFIG")]
    config: Option<PathBuf>,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigFileResolver::new("pep-fusion", "PEP_FUSION_CONFIG");
    let config: EngineConfig = load_or_default(&resolver, args.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&config.logging)?;
    info!("Starting pep-fusion {}", env!("CARGO_PKG_VERSION"));

    let mut orchestrator = ProviderOrchestrator::new(config.provider_timeout());
    for provider_config in &config.providers {
        match StaticProvider::from_config(provider_config) {
            Ok(provider) => {
                orchestrator.register(Arc::new(provider));
            }
            Err(e) => warn!(
                provider = %provider_config.name,
                error = %e,
                "Skipping provider that failed to load"
            ),
        }
    }
    if orchestrator.count() == 0 {
        warn!("No evidence providers registered; report will be empty");
    }

    let pipeline = ScreeningPipeline::new(&config, orchestrator);

    let mut request = ScreeningRequest::new(args.name).with_window(args.start_date, args.end_date);
    if let Some(country) = args.country {
        request = request.with_country(country);
    }

    let report = pipeline.screen(&request).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
