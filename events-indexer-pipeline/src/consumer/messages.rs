//! Message types for the consumer.
//!
//! Defines what the subscription hands to the relay loop.

use events_indexer_shared::RawEvent;

/// Messages produced by the event subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMessage {
    /// An event notification.
    Event(RawEvent),
    /// The watch reported an error. The stream may continue afterwards.
    Error(String),
    /// The watch stream is closed; no further messages will arrive.
    Closed,
}
