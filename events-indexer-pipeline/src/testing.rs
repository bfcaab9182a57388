//! Test doubles shared by the pipeline tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use events_indexer_repository::{IndexAck, IndexSink, SinkError};
use events_indexer_shared::{EncodedDocument, IndexTarget, RawEvent, WatchEventType};

/// Raw event whose metadata name is `name`.
pub(crate) fn raw_event_named(name: &str) -> RawEvent {
    RawEvent::new(
        WatchEventType::Added,
        json!({
            "metadata": {"name": name, "namespace": "default", "uid": format!("uid-{}", name)},
            "involvedObject": {"kind": "Pod", "name": name},
            "reason": "Started",
            "message": format!("Started container {}", name)
        }),
    )
}

/// Encoded document for `raw_event_named(name)`.
pub(crate) fn document_named(name: &str) -> EncodedDocument {
    let event = raw_event_named(name);
    EncodedDocument::new(
        IndexTarget::new("kubernetesevents", "kubernetestable"),
        serde_json::to_vec(&event).unwrap(),
        event.identity(),
    )
}

/// Mock index sink recording every call.
pub(crate) struct MockSink {
    attempts: Mutex<Vec<String>>,
    refresh_flags: Mutex<Vec<bool>>,
    ensured: Mutex<Vec<String>>,
    failing: HashSet<String>,
    transient_failures: AtomicUsize,
    fail_ensure_index: bool,
    delivery_delay: Option<Duration>,
}

impl MockSink {
    pub(crate) fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            refresh_flags: Mutex::new(Vec::new()),
            ensured: Mutex::new(Vec::new()),
            failing: HashSet::new(),
            transient_failures: AtomicUsize::new(0),
            fail_ensure_index: false,
            delivery_delay: None,
        }
    }

    /// Always fail deliveries of the event named `name`.
    pub(crate) fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Fail the next `count` deliveries, whatever the event.
    pub(crate) fn transient_failures(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail `ensure_index` as if the backend were unreachable.
    pub(crate) fn failing_ensure_index(mut self) -> Self {
        self.fail_ensure_index = true;
        self
    }

    /// Take `delay` to answer every delivery.
    pub(crate) fn delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = Some(delay);
        self
    }

    /// Event names of every delivery attempt, in order.
    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn refresh_flags(&self) -> Vec<bool> {
        self.refresh_flags.lock().unwrap().clone()
    }

    pub(crate) fn ensured_indices(&self) -> Vec<String> {
        self.ensured.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexSink for MockSink {
    async fn ensure_index(&self, index: &str) -> Result<(), SinkError> {
        self.ensured.lock().unwrap().push(index.to_string());
        if self.fail_ensure_index {
            return Err(SinkError::index_creation("connection refused"));
        }
        Ok(())
    }

    async fn index_document(
        &self,
        document: &EncodedDocument,
        refresh: bool,
    ) -> Result<IndexAck, SinkError> {
        let name = document.identity.name.clone().unwrap_or_default();
        self.attempts.lock().unwrap().push(name.clone());
        self.refresh_flags.lock().unwrap().push(refresh);

        if let Some(delay) = self.delivery_delay {
            tokio::time::sleep(delay).await;
        }

        let transient = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.failing.contains(&name) {
            return Err(SinkError::index("simulated network error"));
        }

        Ok(IndexAck {
            status: 201,
            id: Some(format!("id-{}", name)),
            result: Some("created".to_string()),
        })
    }

    async fn health_check(&self) -> Result<bool, SinkError> {
        Ok(!self.fail_ensure_index)
    }
}
