//! # Events Indexer Repository
//!
//! This crate provides the trait and implementation for writing event
//! documents to the index backend. It includes definitions for errors,
//! the `IndexSink` interface, and a concrete implementation for
//! OpenSearch/Elasticsearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::SinkOptions;
pub use errors::SinkError;
pub use interfaces::{IndexAck, IndexSink};
pub use opensearch::OpenSearchSink;
