//! Core configuration and process setup for the attire assistant.

pub mod config;
pub mod error;

pub use config::{
    AppConfig, CachePolicy, Credential, ForecastParams, RecommenderConfig, ValidationResult,
};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize the tracing subscriber for the process.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("attire core initialized");
    Ok(())
}
