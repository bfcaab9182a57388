//! Kubernetes event watch subscription.
//!
//! A background task owns the watch stream and forwards notifications over a
//! bounded channel. The relay loop reads that channel one message at a time.

use futures::StreamExt;
use k8s_openapi::api::core::v1::Event;
use kube::api::WatchEvent;
use kube::Client;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, trace, warn};

use crate::consumer::messages::SourceMessage;
use crate::errors::PipelineError;
use events_indexer_shared::{RawEvent, WatchEventType};

/// Cluster-wide events collection.
const EVENTS_PATH: &str = "/api/v1/events";

/// Resource version for the watch: none, start from the current state.
const WATCH_FROM_CURRENT: &str = "";

/// Configuration for the watch subscription.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Server-side watch timeout in seconds. None sends no timeout, so the
    /// watch stays open until the server or the connection ends it.
    pub timeout_secs: Option<u32>,
    /// Size of the buffer between the watch task and the relay loop.
    pub channel_capacity: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            channel_capacity: 1024,
        }
    }
}

impl WatchOptions {
    /// Build the watch request on all namespaces.
    ///
    /// Bookmarks are not requested and `timeoutSeconds` is only present when
    /// a timeout is configured.
    fn watch_request(&self) -> Result<http::Request<Vec<u8>>, http::Error> {
        let mut uri = format!(
            "{}?watch=true&resourceVersion={}",
            EVENTS_PATH, WATCH_FROM_CURRENT
        );
        if let Some(secs) = self.timeout_secs {
            uri.push_str(&format!("&timeoutSeconds={}", secs));
        }

        http::Request::get(uri).body(Vec::new())
    }
}

/// A live subscription to the cluster's event stream.
///
/// `next_message` blocks until a message arrives and reports
/// `SourceMessage::Closed` once the producer is gone, so callers never need
/// to poll.
pub struct EventSubscription {
    receiver: mpsc::Receiver<SourceMessage>,
}

impl EventSubscription {
    /// Open a watch on events in all namespaces.
    ///
    /// Returns once the API server has accepted the watch request.
    ///
    /// # Returns
    ///
    /// * `Ok(EventSubscription)` - A subscription streaming events
    /// * `Err(PipelineError::ConnectionError)` - If the watch request fails
    #[instrument(skip(client))]
    pub async fn open(client: Client, options: WatchOptions) -> Result<Self, PipelineError> {
        let (sender, receiver) = mpsc::channel(options.channel_capacity);
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(run_watch(client, options, sender, ready_tx));

        match ready_rx.await {
            Ok(Ok(())) => {
                info!("Watching events in all namespaces");
                Ok(Self { receiver })
            }
            Ok(Err(e)) => Err(PipelineError::connection(format!(
                "Failed to watch events: {}",
                e
            ))),
            Err(_) => Err(PipelineError::connection(
                "Watch task ended before the watch was established",
            )),
        }
    }

    /// Wrap an existing channel of source messages.
    pub fn from_receiver(receiver: mpsc::Receiver<SourceMessage>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message.
    pub async fn next_message(&mut self) -> SourceMessage {
        self.receiver.recv().await.unwrap_or(SourceMessage::Closed)
    }
}

/// Issue the watch request and forward its notifications until the stream ends.
async fn run_watch(
    client: Client,
    options: WatchOptions,
    sender: mpsc::Sender<SourceMessage>,
    ready: oneshot::Sender<Result<(), String>>,
) {
    let request = match options.watch_request() {
        Ok(request) => request,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let stream = match client.request_events::<Event>(request).await {
        Ok(stream) => {
            let _ = ready.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    futures::pin_mut!(stream);

    while let Some(item) = stream.next().await {
        let message = match item {
            Ok(event) => to_source_message(event),
            Err(e) => Some(SourceMessage::Error(format!("Watch stream error: {}", e))),
        };

        if let Some(message) = message {
            if sender.send(message).await.is_err() {
                debug!("Subscription dropped, stopping watch");
                return;
            }
        }
    }

    info!("Event watch stream ended");
}

/// Convert one watch notification into a source message.
///
/// Bookmarks carry no event and yield `None`.
fn to_source_message(event: WatchEvent<Event>) -> Option<SourceMessage> {
    let (event_type, object) = match event {
        WatchEvent::Added(object) => (WatchEventType::Added, object),
        WatchEvent::Modified(object) => (WatchEventType::Modified, object),
        WatchEvent::Deleted(object) => (WatchEventType::Deleted, object),
        WatchEvent::Bookmark(bookmark) => {
            trace!(
                resource_version = %bookmark.metadata.resource_version,
                "Skipping watch bookmark"
            );
            return None;
        }
        WatchEvent::Error(status) => {
            warn!(code = status.code, reason = %status.reason, "Watch returned an error status");
            return Some(SourceMessage::Error(format!(
                "Watch error {} ({}): {}",
                status.code, status.reason, status.message
            )));
        }
    };

    match serde_json::to_value(&object) {
        Ok(value) => Some(SourceMessage::Event(RawEvent::new(event_type, value))),
        Err(e) => Some(SourceMessage::Error(format!(
            "Failed to read {} event {:?}/{:?}: {}",
            event_type, object.metadata.namespace, object.metadata.name, e
        ))),
    }
}
