//! Cooperative cancellation of long-running waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A cloneable flag that cancels a caller's wait.
///
/// Canceling only stops the local wait; the server-side operation keeps
/// running.
///
/// # Example
///
/// ```rust
/// use azure_api::arm::CancellationSignal;
///
/// let signal = CancellationSignal::new();
/// let handle = signal.clone();
/// assert!(!signal.is_canceled());
/// handle.cancel();
/// assert!(signal.is_canceled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    canceled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    /// Creates a signal that has not been canceled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every wait observing this signal.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::SeqCst)
    }

    /// Resolves once the signal is canceled.
    pub async fn canceled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_canceled() {
                return;
            }
            notified.await;
        }
    }
}
