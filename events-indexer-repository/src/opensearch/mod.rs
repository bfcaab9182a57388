//! OpenSearch implementation of the index sink.
//!
//! This module provides a concrete implementation of `IndexSink` using the
//! OpenSearch client, which speaks the same document API as Elasticsearch.

mod client;

pub use client::OpenSearchSink;
