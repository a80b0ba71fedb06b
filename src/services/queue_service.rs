//! Generation queue: the asynchronous boundary between the uploader and
//! the thumbnail worker.
//!
//! A message body is exactly the original's storage key as a plain string,
//! nothing more. The channel decouples the upload response from thumbnail
//! generation; the uploader never waits for the worker. Delivery may repeat
//! under retries upstream, which is harmless because the worker's write is
//! idempotent.

use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("generation queue is closed")]
    Closed,
}

/// Sending half of the generation queue, cloned into application state.
#[derive(Clone)]
pub struct GenerationQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl GenerationQueue {
    /// Create a queue and the receiving half the worker consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue one generation request for `key`.
    pub fn send(&self, key: &str) -> Result<(), QueueError> {
        self.tx.send(key.to_string()).map_err(|_| QueueError::Closed)
    }

    /// Whether the receiving half is still alive. Used by readiness checks.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
