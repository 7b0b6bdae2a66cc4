//! HTTP transport layer for the Nylas client.
//!
//! Everything above this module talks to the network through the
//! [`HttpTransport`] trait only, so the reqwest-backed implementation can be
//! swapped for a scripted one without touching callers.

mod http;

pub use http::{HttpMethod, HttpTransport, RequestDescriptor, ResponseEnvelope, ReqwestTransport};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The request could not be built (bad URL, invalid header).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

/// Replaceable reference to the active transport.
///
/// Requests take a clone of the current `Arc` and release the lock before
/// sending, so a replacement never blocks on an in-flight call. Replacing the
/// transport while requests are in flight is not supported: those requests
/// finish on whichever transport they already picked up.
pub struct TransportHandle {
    inner: RwLock<Arc<dyn HttpTransport>>,
}

impl TransportHandle {
    /// Wraps a transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: RwLock::new(transport),
        }
    }

    /// Returns the transport currently in use.
    pub fn current(&self) -> Arc<dyn HttpTransport> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in a new transport and returns the previous one.
    pub fn replace(&self, transport: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, transport)
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHandle")
            .field("transport", &self.current().name())
            .finish()
    }
}
