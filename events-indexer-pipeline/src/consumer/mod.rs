//! Consumer module for the events indexer pipeline.
//!
//! Provides the Kubernetes client setup and the event watch subscription.

mod client;
mod messages;
mod subscription;

pub use client::build_client;
pub use messages::SourceMessage;
pub use subscription::{EventSubscription, WatchOptions};
