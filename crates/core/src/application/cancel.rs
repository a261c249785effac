// Cancellation Token
// First-error-wins aggregation cancels sibling tasks instead of leaking
// them; every suspension point (retry sleeps, worker loops) observes the
// token. Dropping the canceller also cancels: an abandoned operation
// (e.g. a deadline expiry dropping its future) takes its spawned work
// down with it.

use tokio::sync::watch;

/// Cancellation signal observed by in-flight tasks
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested or the canceller is gone
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until cancellation is requested
    ///
    /// Resolves when the canceller fires or is dropped, so this is safe
    /// to race against sleeps and channel operations.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Canceller dropped: the owning operation is gone
                return;
            }
        }
    }

    /// A token that is never cancelled
    pub fn never() -> Self {
        static NEVER: std::sync::OnceLock<watch::Sender<bool>> = std::sync::OnceLock::new();
        let tx = NEVER.get_or_init(|| watch::channel(false).0);
        Self { rx: tx.subscribe() }
    }
}

/// Cancellation sender
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    /// Signal cancellation to all token holders
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancellation pair
pub fn cancel_pair() -> (Canceller, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancelToken { rx })
}
