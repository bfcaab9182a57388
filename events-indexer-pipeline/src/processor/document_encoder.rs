//! Document encoder implementation.
//!
//! Serializes raw events into documents for the index. The encoding is a
//! direct structural serialization: no field is renamed, filtered or added.

use tracing::instrument;

use crate::errors::PipelineError;
use events_indexer_shared::{EncodedDocument, IndexTarget, RawEvent};

/// Encoder that turns raw events into index documents.
///
/// Target coordinates are fixed at construction and never derived from the
/// event.
#[derive(Debug, Clone)]
pub struct DocumentEncoder {
    target: IndexTarget,
}

impl DocumentEncoder {
    /// Create a new encoder writing to the given target.
    pub fn new(target: IndexTarget) -> Self {
        Self { target }
    }

    /// The target every document is addressed to.
    pub fn target(&self) -> &IndexTarget {
        &self.target
    }

    /// Encode a single event.
    ///
    /// # Returns
    ///
    /// * `Ok(EncodedDocument)` - The serialized event with its target
    /// * `Err(PipelineError::EncodingError)` - If serialization fails
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub fn encode(&self, event: &RawEvent) -> Result<EncodedDocument, PipelineError> {
        let identity = event.identity();
        let body = serde_json::to_vec(event).map_err(|e| {
            PipelineError::encoding(format!("Failed to serialize event {}: {}", identity, e))
        })?;

        Ok(EncodedDocument::new(self.target.clone(), body, identity))
    }
}
