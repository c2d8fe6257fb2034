//! Cooperative shutdown signalling between the process entrypoint and the
//! long-running workers.  A `ShutdownSignal` is held by whoever decides to
//! stop the process (usually the signal listener); each worker holds a
//! `ShutdownGuard` and checks it at every wait point.

use tokio::sync::watch;

/// Sender half.  Cloneable; the first `send` wins and later sends are no-ops.
#[derive(Clone, Debug)]
pub struct ShutdownSignal(watch::Sender<bool>);

impl ShutdownSignal {
    pub fn send(&self) {
        // Receivers may already be gone if the worker exited on its own.
        let _ = self.0.send(true);
    }
}

/// Receiver half handed to workers.
#[derive(Clone, Debug)]
pub struct ShutdownGuard(watch::Receiver<bool>);

impl ShutdownGuard {
    /// Non-blocking check, for use inside tight loops.
    pub fn should_shutdown(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves when shutdown has been signalled.  For use in `select!`.
    pub async fn wait_for_shutdown(&mut self) {
        while !*self.0.borrow_and_update() {
            if self.0.changed().await.is_err() {
                // Sender dropped without signalling; treat as shutdown.
                return;
            }
        }
    }
}

/// Creates a connected signal/guard pair.
pub fn shutdown_channel() -> (ShutdownSignal, ShutdownGuard) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSignal(tx), ShutdownGuard(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_observed_by_guard() {
        let (signal, mut guard) = shutdown_channel();
        assert!(!guard.should_shutdown());

        signal.send();
        guard.wait_for_shutdown().await;
        assert!(guard.should_shutdown());
    }

    #[tokio::test]
    async fn test_dropped_signal_unblocks_wait() {
        let (signal, mut guard) = shutdown_channel();
        drop(signal);
        // Must not hang.
        guard.wait_for_shutdown().await;
    }
}
