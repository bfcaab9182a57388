//! Configuration types for the index sink.

use std::time::Duration;

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Options applied to every request the sink sends.
#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Timeout for a single request. Set to None to wait until the
    /// transport itself gives up.
    pub request_timeout: Option<Duration>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl SinkOptions {
    /// Options with no request timeout.
    pub fn without_timeout() -> Self {
        Self {
            request_timeout: None,
        }
    }

    /// Options with a custom request timeout.
    pub fn with_request_timeout(timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
        }
    }
}
