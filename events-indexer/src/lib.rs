//! # Events Indexer
//!
//! Main library for the Kubernetes events indexer.
//!
//! This crate provides the entry point and configuration for running the
//! events relay pipeline.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;
use tracing::info;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] events_indexer_pipeline::PipelineError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Wire up the pipeline and relay events until it stops.
///
/// Returns an error for fatal startup failures and when the event
/// subscription closes; `Ok` only after a requested shutdown.
pub async fn run(settings: &Settings) -> Result<(), IndexingError> {
    let mut dependencies = Dependencies::new(settings).await?;

    let stats = dependencies.orchestrator.run().await?;

    info!(
        received = stats.received,
        delivered = stats.delivered,
        dropped = stats.dropped,
        "Events indexer shut down"
    );
    Ok(())
}
