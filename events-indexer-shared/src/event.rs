//! Raw event types.
//!
//! A `RawEvent` is one notification from the watch stream. The event record
//! itself is kept schema-free so it can be forwarded without loss.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of change a watch notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchEventType {
    /// The event object was created.
    Added,
    /// The event object was updated (e.g. its count was bumped).
    Modified,
    /// The event object was removed (usually by TTL expiry).
    Deleted,
}

impl WatchEventType {
    /// The wire name of the notification type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for WatchEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event notification received from the watch stream.
///
/// Serializes as `{"type": "ADDED", "object": {...}}`, with the object left
/// exactly as the control plane sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The notification type.
    #[serde(rename = "type")]
    pub event_type: WatchEventType,
    /// The event record.
    pub object: Value,
}

impl RawEvent {
    /// Create a new raw event.
    pub fn new(event_type: WatchEventType, object: Value) -> Self {
        Self { event_type, object }
    }

    /// Extract the identity of the event for log context.
    pub fn identity(&self) -> EventIdentity {
        EventIdentity::from_object(&self.object)
    }
}

/// Best-effort identity of an event, used to label log lines.
///
/// Every field is optional: the record is not validated, so any of them may
/// be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventIdentity {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub uid: Option<String>,
    pub reason: Option<String>,
    pub involved_kind: Option<String>,
    pub involved_name: Option<String>,
}

impl EventIdentity {
    /// Pull identity fields out of an event object.
    pub fn from_object(object: &Value) -> Self {
        let field = |pointer: &str| {
            object
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            namespace: field("/metadata/namespace"),
            name: field("/metadata/name"),
            uid: field("/metadata/uid"),
            reason: field("/reason"),
            involved_kind: field("/involvedObject/kind"),
            involved_name: field("/involvedObject/name"),
        }
    }
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = self.namespace.as_deref().unwrap_or("-");
        let name = self.name.as_deref().unwrap_or("-");
        write!(f, "{}/{}", namespace, name)?;
        if let Some(uid) = &self.uid {
            write!(f, " ({})", uid)?;
        }
        Ok(())
    }
}
