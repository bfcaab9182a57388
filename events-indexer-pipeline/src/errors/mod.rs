//! Error types for the events indexer pipeline.

use events_indexer_repository::SinkError;
use thiserror::Error;

/// Errors that can occur in the relay pipeline.
///
/// Configuration and connection errors are fatal at startup. Encoding and
/// delivery errors are recoverable: the event is dropped and the relay
/// continues. Subscription exhaustion ends the relay.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Could not build the Kubernetes client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Could not construct a client or open the watch.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An event could not be serialized.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// A document could not be delivered to the index.
    #[error("Delivery error: {0}")]
    DeliveryError(String),

    /// The watch stream was closed by the producer.
    #[error("Event subscription exhausted")]
    SubscriptionExhausted,

    /// Error from the index sink.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingError(msg.into())
    }

    /// Create a delivery error.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::DeliveryError(msg.into())
    }
}
