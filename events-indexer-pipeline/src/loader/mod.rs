//! Loader module for the events indexer pipeline.
//!
//! Delivers encoded documents to the index sink.

use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use crate::errors::PipelineError;
use events_indexer_repository::{IndexAck, IndexSink};
use events_indexer_shared::{EncodedDocument, EventIdentity};

/// Tracing target for events the relay gave up on.
pub const DEAD_LETTER_TARGET: &str = "events_indexer::dead_letter";

/// Retry policy for failed deliveries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means at-most-once delivery.
    pub max_retries: u32,
    /// Wait before the first retry. Doubles on every further retry.
    pub initial_backoff: Duration,
    /// Upper bound for a single wait.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy with the given number of retries and default backoff.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// How long to wait before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Configuration for the document loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Ask the backend to make each document visible before acknowledging.
    pub refresh: bool,
    /// Retry policy for failed deliveries.
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            refresh: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Loader that delivers documents to the index sink one at a time.
///
/// The loader is responsible for:
/// - Passing the refresh option to every delivery
/// - Retrying failed deliveries according to the retry policy
/// - Recording dropped documents on the dead-letter log
pub struct DocumentLoader {
    sink: Arc<dyn IndexSink>,
    config: LoaderConfig,
}

impl DocumentLoader {
    /// Create a new loader with the default configuration.
    pub fn new(sink: Arc<dyn IndexSink>) -> Self {
        Self {
            sink,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(sink: Arc<dyn IndexSink>, config: LoaderConfig) -> Self {
        Self { sink, config }
    }

    /// Deliver a single document.
    ///
    /// Returns the backend acknowledgment, or a delivery error once the retry
    /// policy is exhausted. A document that fails is written to the
    /// dead-letter log before the error is returned.
    #[instrument(skip(self, document), fields(event = %document.identity))]
    pub async fn deliver(&self, document: &EncodedDocument) -> Result<IndexAck, PipelineError> {
        let mut retry = 0;

        loop {
            match self.sink.index_document(document, self.config.refresh).await {
                Ok(ack) => return Ok(ack),
                Err(e) if retry < self.config.retry.max_retries => {
                    let backoff = self.config.retry.backoff_for(retry);
                    warn!(
                        error = %e,
                        retry = retry + 1,
                        max_retries = self.config.retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Delivery failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    retry += 1;
                }
                Err(e) => {
                    let attempts = retry + 1;
                    dead_letter(&document.identity, &e.to_string(), Some(&document.body_lossy()));
                    return Err(PipelineError::delivery(format!(
                        "{} after {} attempt(s)",
                        e, attempts
                    )));
                }
            }
        }
    }

    /// Ensure the destination index exists.
    pub async fn ensure_index(&self, index: &str) -> Result<(), PipelineError> {
        self.sink.ensure_index(index).await.map_err(PipelineError::from)
    }

    /// Check if the index backend is healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        self.sink.health_check().await.map_err(PipelineError::from)
    }
}

/// Record a dropped event on the dead-letter log.
pub(crate) fn dead_letter(identity: &EventIdentity, error: &str, body: Option<&str>) {
    warn!(
        target: DEAD_LETTER_TARGET,
        namespace = identity.namespace.as_deref().unwrap_or_default(),
        name = identity.name.as_deref().unwrap_or_default(),
        uid = identity.uid.as_deref().unwrap_or_default(),
        reason = identity.reason.as_deref().unwrap_or_default(),
        error = %error,
        body = body.unwrap_or_default(),
        "Dropped event"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document_named, MockSink};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(700),
        };

        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(700));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(700));
    }

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert!(config.refresh);
        assert_eq!(config.retry.max_retries, 0);
    }

    #[tokio::test]
    async fn test_deliver_success() {
        let sink = Arc::new(MockSink::new());
        let loader = DocumentLoader::new(sink.clone());

        let ack = loader.deliver(&document_named("a")).await.unwrap();

        assert_eq!(ack.status, 201);
        assert_eq!(sink.attempts(), vec!["a"]);
        assert_eq!(sink.refresh_flags(), vec![true]);
    }

    #[tokio::test]
    async fn test_deliver_passes_refresh_option() {
        let sink = Arc::new(MockSink::new());
        let config = LoaderConfig {
            refresh: false,
            ..Default::default()
        };
        let loader = DocumentLoader::with_config(sink.clone(), config);

        loader.deliver(&document_named("a")).await.unwrap();

        assert_eq!(sink.refresh_flags(), vec![false]);
    }

    #[tokio::test]
    async fn test_deliver_without_retries_fails_once() {
        let sink = Arc::new(MockSink::new().failing_for("a"));
        let loader = DocumentLoader::new(sink.clone());

        let result = loader.deliver(&document_named("a")).await;

        assert!(matches!(result, Err(PipelineError::DeliveryError(_))));
        assert_eq!(sink.attempts(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deliver_retries_with_backoff() {
        let sink = Arc::new(MockSink::new().failing_for("a"));
        let config = LoaderConfig {
            refresh: true,
            retry: RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(1),
            },
        };
        let loader = DocumentLoader::with_config(sink.clone(), config);

        let start = Instant::now();
        let result = loader.deliver(&document_named("a")).await;

        assert!(result.is_err());
        assert_eq!(sink.attempts(), vec!["a", "a", "a"]);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deliver_recovers_after_transient_failure() {
        let sink = Arc::new(MockSink::new().transient_failures(1));
        let config = LoaderConfig {
            refresh: true,
            retry: RetryPolicy::with_max_retries(3),
        };
        let loader = DocumentLoader::with_config(sink.clone(), config);

        let ack = loader.deliver(&document_named("a")).await.unwrap();

        assert_eq!(ack.status, 201);
        assert_eq!(sink.attempts(), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn test_ensure_index_error_is_reported() {
        let sink = Arc::new(MockSink::new().failing_ensure_index());
        let loader = DocumentLoader::new(sink.clone());

        let result = loader.ensure_index("kubernetesevents").await;

        assert!(matches!(result, Err(PipelineError::Sink(_))));
        assert_eq!(sink.ensured_indices(), vec!["kubernetesevents"]);
    }
}
