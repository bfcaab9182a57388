//! OpenSearch sink implementation.
//!
//! This module provides the concrete implementation of `IndexSink` using the
//! OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        headers::{HeaderMap, HeaderValue, CONTENT_TYPE},
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::IndicesCreateParts,
    OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::SinkOptions;
use crate::errors::SinkError;
use crate::interfaces::{IndexAck, IndexSink};
use events_indexer_shared::EncodedDocument;

/// Error type the backend reports when creating an index that exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch sink implementation.
///
/// Holds one client for the lifetime of the process. Documents are posted
/// to the raw document endpoint of the configured index and type.
///
/// # Example
///
/// ```ignore
/// let sink = OpenSearchSink::new("http://127.0.0.1:9200/", SinkOptions::default())?;
/// sink.ensure_index("kubernetesevents").await?;
/// let ack = sink.index_document(&document, true).await?;
/// ```
pub struct OpenSearchSink {
    client: OpenSearch,
    options: SinkOptions,
}

impl OpenSearchSink {
    /// Create a new sink connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The backend base URL (e.g., "http://127.0.0.1:9200/")
    /// * `options` - Per-request options
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchSink)` - A new sink instance
    /// * `Err(SinkError)` - If the URL is invalid or the transport can't be built
    pub fn new(url: &str, options: SinkOptions) -> Result<Self, SinkError> {
        let parsed_url = Url::parse(url).map_err(|e| SinkError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            request_timeout = ?options.request_timeout,
            "Created OpenSearch sink"
        );

        Ok(Self { client, options })
    }

    /// Build an acknowledgment from a successful response body.
    ///
    /// Any 2xx response counts as an acknowledgment, so a body that isn't
    /// JSON only loses the optional fields.
    fn parse_ack(status: u16, body: &str) -> IndexAck {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        IndexAck {
            status,
            id: field("_id"),
            result: field("result"),
        }
    }
}

#[async_trait]
impl IndexSink for OpenSearchSink {
    #[instrument(skip(self))]
    async fn ensure_index(&self, index: &str) -> Result<(), SinkError> {
        let indices = self.client.indices();
        let mut request = indices.create(IndicesCreateParts::Index(index));
        if let Some(timeout) = self.options.request_timeout {
            request = request.request_timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %index, "Created index");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        if error_body.contains(ALREADY_EXISTS_ERROR) {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        error!(status = %status, body = %error_body, "Index creation failed");
        Err(SinkError::index_creation(format!(
            "Index creation failed with status {}: {}",
            status, error_body
        )))
    }

    async fn index_document(
        &self,
        document: &EncodedDocument,
        refresh: bool,
    ) -> Result<IndexAck, SinkError> {
        let path = document.target.document_path();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let refresh_query = [("refresh", "true")];
        let query_string = if refresh {
            Some(&refresh_query[..])
        } else {
            None
        };

        let response = self
            .client
            .send(
                Method::Post,
                &path,
                headers,
                query_string,
                Some(document.body.clone()),
                self.options.request_timeout,
            )
            .await
            .map_err(|e| SinkError::index(e.to_string()))?;

        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(SinkError::index(format!(
                "Index request failed with status {}: {}",
                status, body
            )));
        }

        Ok(Self::parse_ack(status.as_u16(), &body))
    }

    async fn health_check(&self) -> Result<bool, SinkError> {
        let cluster = self.client.cluster();
        let mut request = cluster.health(ClusterHealthParts::None);
        if let Some(timeout) = self.options.request_timeout {
            request = request.request_timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::health_check(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SinkError::parse(e.to_string()))?;

        let status = body["status"].as_str().unwrap_or("red");
        debug!(status = %status, "Cluster health");

        Ok(status == "green" || status == "yellow")
    }
}
