//! # Events Indexer Pipeline
//!
//! This crate provides the relay pipeline that watches Kubernetes events
//! and indexes them into OpenSearch/Elasticsearch.
//!
//! ## Architecture
//!
//! The pipeline follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Watches events from the Kubernetes API
//! 2. **Processor**: Encodes each event into an index document
//! 3. **Loader**: Delivers documents to the index sink
//! 4. **Orchestrator**: Runs the relay loop and applies the failure policy

pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use errors::PipelineError;

#[cfg(test)]
mod testing;
