//! Sink error types.
//!
//! This module defines the error types that can occur while talking to the
//! index backend.

use thiserror::Error;

/// Errors that can occur during index sink operations.
#[derive(Error, Debug, Clone)]
pub enum SinkError {
    /// Failed to set up the connection to the index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create the destination index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to index a single document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to query cluster health.
    #[error("Health check error: {0}")]
    HealthCheckError(String),
}

impl SinkError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a health check error.
    pub fn health_check(msg: impl Into<String>) -> Self {
        Self::HealthCheckError(msg.into())
    }
}
