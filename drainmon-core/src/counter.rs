//! Pending background-task counter
//!
//! A thread-safe count of in-flight background work, incremented once per
//! task submission and decremented exactly once per terminal completion
//! (success or failure). The drain phase of a monitoring run uses this
//! counter, exposed through the server's metrics endpoint, as its
//! completion oracle.

use std::sync::{Arc, Mutex};
use tracing::warn;

/// Clone-able handle to a shared pending-task counter
///
/// A handle is injected into whatever submits and completes background
/// work; there is no ambient global. Reads take the same lock as writes so
/// a reported value is never torn.
#[derive(Debug, Clone, Default)]
pub struct PendingTaskCounter {
    inner: Arc<Mutex<u64>>,
}

impl PendingTaskCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a background task submission
    pub fn increment(&self) {
        let mut count = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
    }

    /// Record a background task reaching a terminal state
    ///
    /// Decrementing past zero is a caller bug (a completion recorded
    /// twice, or one without a matching submission); the count saturates
    /// rather than wrapping so the invariant "never negative" holds.
    pub fn decrement(&self) {
        let mut count = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if *count == 0 {
            warn!("pending task counter decremented below zero; ignoring");
            return;
        }
        *count -= 1;
    }

    /// Current number of in-flight background tasks
    pub fn read(&self) -> u64 {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
