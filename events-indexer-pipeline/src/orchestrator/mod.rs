//! Orchestrator module for the events indexer pipeline.
//!
//! Runs the relay loop: receive an event, encode it, deliver it, repeat.

use std::future::Future;

use tokio::sync::{broadcast, watch};
use tracing::{error, info, instrument, warn};

use crate::consumer::{EventSubscription, SourceMessage};
use crate::errors::PipelineError;
use crate::loader::{dead_letter, DocumentLoader};
use crate::processor::DocumentEncoder;
use events_indexer_shared::RawEvent;

/// Lifecycle of the relay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Ensuring the index exists.
    Starting,
    /// Relaying events.
    Running,
    /// The subscription closed; winding down.
    Draining,
    /// The loop has stopped.
    Terminated,
}

/// Counters for one run of the relay loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events received from the subscription.
    pub received: u64,
    /// Events acknowledged by the index.
    pub delivered: u64,
    /// Events dropped after an encoding or delivery failure.
    pub dropped: u64,
    /// Errors reported by the subscription itself.
    pub source_errors: u64,
}

enum Step {
    Message(SourceMessage),
    Shutdown,
}

/// Orchestrator that runs the relay loop.
///
/// The orchestrator:
/// - Ensures the destination index exists (best effort)
/// - Relays events strictly one at a time, in arrival order
/// - Drops and logs events that fail to encode or deliver
/// - Stops when the subscription closes or a shutdown is requested
pub struct Orchestrator {
    subscription: EventSubscription,
    encoder: DocumentEncoder,
    loader: DocumentLoader,
    stats: RelayStats,
    state_tx: watch::Sender<RelayState>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        subscription: EventSubscription,
        encoder: DocumentEncoder,
        loader: DocumentLoader,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (state_tx, _) = watch::channel(RelayState::Starting);

        Self {
            subscription,
            encoder,
            loader,
            stats: RelayStats::default(),
            state_tx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run the relay loop until the subscription closes, a shutdown is
    /// requested, or the process receives Ctrl-C.
    ///
    /// # Returns
    ///
    /// * `Ok(RelayStats)` - After a requested shutdown
    /// * `Err(PipelineError::SubscriptionExhausted)` - When the event stream closed
    pub async fn run(&mut self) -> Result<RelayStats, PipelineError> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Run the relay loop, stopping when `signal` completes.
    ///
    /// The signal is polled for the whole run, so one that fires while an
    /// event is being delivered stops the loop right after that delivery.
    #[instrument(skip(self, signal), fields(index = %self.encoder.target().index))]
    pub async fn run_until<F>(&mut self, signal: F) -> Result<RelayStats, PipelineError>
    where
        F: Future,
    {
        info!("Starting events relay");

        let index = self.encoder.target().index.clone();
        if let Err(e) = self.loader.ensure_index(&index).await {
            warn!(error = %e, "Failed to ensure index exists, continuing");
        }

        self.set_state(RelayState::Running);

        tokio::pin!(signal);

        loop {
            let step = tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => Step::Shutdown,
                _ = &mut signal => Step::Shutdown,
                message = self.subscription.next_message() => Step::Message(message),
            };

            match step {
                Step::Message(SourceMessage::Event(event)) => self.relay_event(event).await,
                Step::Message(SourceMessage::Error(e)) => {
                    self.stats.source_errors += 1;
                    warn!(error = %e, "Event source reported an error");
                }
                Step::Message(SourceMessage::Closed) => {
                    self.set_state(RelayState::Draining);
                    error!("Event subscription closed");
                    self.terminate();
                    return Err(PipelineError::SubscriptionExhausted);
                }
                Step::Shutdown => {
                    info!("Received shutdown signal");
                    self.terminate();
                    return Ok(self.stats);
                }
            }
        }
    }

    /// Encode and deliver one event, dropping it on failure.
    async fn relay_event(&mut self, event: RawEvent) {
        self.stats.received += 1;

        let document = match self.encoder.encode(&event) {
            Ok(document) => document,
            Err(e) => {
                self.stats.dropped += 1;
                let identity = event.identity();
                error!(event = %identity, error = %e, "Dropping event that failed to encode");
                dead_letter(&identity, &e.to_string(), None);
                return;
            }
        };

        match self.loader.deliver(&document).await {
            Ok(ack) => {
                self.stats.delivered += 1;
                info!(
                    event = %document.identity,
                    status = ack.status,
                    id = ?ack.id,
                    result = ?ack.result,
                    "Event indexed"
                );
            }
            Err(e) => {
                self.stats.dropped += 1;
                error!(event = %document.identity, error = %e, "Dropping event after failed delivery");
            }
        }
    }

    fn set_state(&self, state: RelayState) {
        self.state_tx.send_replace(state);
    }

    fn terminate(&self) {
        self.set_state(RelayState::Terminated);
        info!(
            received = self.stats.received,
            delivered = self.stats.delivered,
            dropped = self.stats.dropped,
            source_errors = self.stats.source_errors,
            "Events relay terminated"
        );
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Observe state transitions.
    pub fn state_receiver(&self) -> watch::Receiver<RelayState> {
        self.state_tx.subscribe()
    }

    /// A handle that stops the loop when sent to.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
