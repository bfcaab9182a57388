//! # Events Indexer Shared
//!
//! Data model shared by the events indexer crates: the raw event received
//! from the watch stream and the encoded document handed to the index.

mod document;
mod event;

pub use document::{EncodedDocument, IndexTarget};
pub use event::{EventIdentity, RawEvent, WatchEventType};
