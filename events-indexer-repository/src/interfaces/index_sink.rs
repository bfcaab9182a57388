//! Index sink trait definition.
//!
//! This module defines the abstract interface for writing event documents,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! mocks in tests).

use async_trait::async_trait;

use crate::errors::SinkError;
use events_indexer_shared::EncodedDocument;

/// Acknowledgment returned by the backend for an indexed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexAck {
    /// HTTP status code of the response.
    pub status: u16,
    /// The document ID assigned by the backend, if reported.
    pub id: Option<String>,
    /// The operation result (`created`, `updated`), if reported.
    pub result: Option<String>,
}

/// Abstract interface for the index backend.
///
/// The sink performs no batching, buffering, or retry: every call is a single
/// round trip and failures are surfaced to the caller immediately.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the relay shares one sink behind an
/// `Arc` and never mutates it.
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Ensure the destination index exists.
    ///
    /// Idempotent: an index that already exists counts as success.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index exists or was created
    /// * `Err(SinkError)` - If creation failed for another reason
    async fn ensure_index(&self, index: &str) -> Result<(), SinkError>;

    /// Send one document for indexing.
    ///
    /// # Arguments
    ///
    /// * `document` - The encoded document, including its target coordinates
    /// * `refresh` - Whether the backend must make the document visible to
    ///   reads before acknowledging
    ///
    /// # Returns
    ///
    /// * `Ok(IndexAck)` - If the backend acknowledged the document
    /// * `Err(SinkError)` - On transport failure or a non-2xx response
    async fn index_document(
        &self,
        document: &EncodedDocument,
        refresh: bool,
    ) -> Result<IndexAck, SinkError>;

    /// Check if the backend is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If cluster health is green or yellow
    /// * `Ok(false)` - If cluster health is red
    /// * `Err(SinkError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SinkError>;
}
