//! Shutdown coordination for listeners.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Every serving task holds a [`ShutdownSignal`]. Triggering, or dropping
/// the coordinator, releases all of them.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe before triggering; late subscribers miss the signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Signals still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the shutdown signal.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the coordinator is gone.
    pub async fn recv(mut self) {
        let _ = self.rx.recv().await;
    }
}
