//! Error types for the events indexer repository.

mod sink_error;

pub use sink_error::SinkError;
