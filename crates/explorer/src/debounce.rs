//! Debounced delivery of user input.
//!
//! At most one timer is pending. Every new value replaces the pending one and
//! restarts the quiet period; a value is delivered once the input has been
//! quiet for the whole window.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

pub struct Debouncer<T> {
    window: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its settled values arrive on.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            window,
            pending: None,
            tx,
        };
        (debouncer, rx)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Submit a new value, cancelling any value still waiting
    pub fn push(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            sleep(window).await;
            // The receiver may be gone at shutdown
            let _ = tx.send(value);
        }));
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
