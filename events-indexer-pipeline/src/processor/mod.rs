//! Processor module for the events indexer pipeline.
//!
//! Encodes raw events into index documents.

mod document_encoder;

pub use document_encoder::DocumentEncoder;
