//! One-shot, multi-waiter completion signal.

use tokio::sync::watch;

/// Settles exactly once; any number of waiters observe it.
///
/// Backed by a `watch` channel holding `false` until settled. Waiters that
/// subscribe after the signal see it immediately.
#[derive(Debug)]
pub struct Completion {
    tx: watch::Sender<bool>,
}

impl Completion {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Settle the signal. Returns `false` if it was already settled.
    pub(crate) fn signal(&self) -> bool {
        self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    /// Wait until the signal is settled.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender is owned by `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}
