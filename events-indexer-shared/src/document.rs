//! Encoded document types.

use crate::event::EventIdentity;

/// Where documents are written in the index backend.
///
/// Fixed at startup from configuration, never derived from an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    /// Destination index name.
    pub index: String,
    /// Destination document type. Empty for typeless backends.
    pub document_type: String,
}

impl IndexTarget {
    /// Create a new index target.
    pub fn new(index: impl Into<String>, document_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            document_type: document_type.into(),
        }
    }

    /// The request path documents are posted to.
    ///
    /// `/<index>/<type>/`, or `/<index>/_doc` when no type is configured.
    pub fn document_path(&self) -> String {
        if self.document_type.is_empty() {
            format!("/{}/_doc", self.index)
        } else {
            format!("/{}/{}/", self.index, self.document_type)
        }
    }
}

/// A serialized event ready to be sent to the index.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    /// Where the document goes.
    pub target: IndexTarget,
    /// The JSON body.
    pub body: Vec<u8>,
    /// Identity of the source event, for logging.
    pub identity: EventIdentity,
}

impl EncodedDocument {
    /// Create a new encoded document.
    pub fn new(target: IndexTarget, body: Vec<u8>, identity: EventIdentity) -> Self {
        Self {
            target,
            body,
            identity,
        }
    }

    /// The body as text, for logging dropped documents.
    pub fn body_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
