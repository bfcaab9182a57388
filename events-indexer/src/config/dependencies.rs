//! Dependency initialization and wiring for the events indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::IndexingError;
use events_indexer_pipeline::{
    consumer::{build_client, EventSubscription},
    loader::DocumentLoader,
    orchestrator::Orchestrator,
    processor::DocumentEncoder,
};
use events_indexer_repository::OpenSearchSink;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// The index backend health is only logged: an unreachable backend is logged and
    /// startup continues. Failing to build the Kubernetes client or to open
    /// the event watch is fatal.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        let target = settings.index_target();

        info!(
            elasticsearch_host = %settings.elasticsearch_host,
            index = %target.index,
            document_type = %target.document_type,
            refresh = settings.refresh,
            kubeconfig = ?settings.kubeconfig,
            "Initializing dependencies"
        );

        // Initialize index sink
        let sink = OpenSearchSink::new(&settings.elasticsearch_host, settings.sink_options())
            .map_err(|e| IndexingError::config(format!("Failed to create index sink: {}", e)))?;
        let loader = DocumentLoader::with_config(Arc::new(sink), settings.loader_config());

        match loader.health_check().await {
            Ok(true) => info!("Elasticsearch connection verified"),
            Ok(false) => warn!("Elasticsearch cluster is unhealthy, continuing"),
            Err(e) => warn!(error = %e, "Elasticsearch health check failed, continuing"),
        }

        // Initialize Kubernetes client and event watch
        let client = build_client(settings.kubeconfig.as_deref()).await?;
        info!("Kubernetes client created");

        let subscription = EventSubscription::open(client, settings.watch_options()).await?;

        // Initialize encoder
        let encoder = DocumentEncoder::new(target);

        // Create orchestrator
        let orchestrator = Orchestrator::new(subscription, encoder, loader);

        Ok(Self { orchestrator })
    }
}
