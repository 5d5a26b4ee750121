//! Graceful shutdown signal

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

/// Broadcasts a single shutdown notification to every subscriber
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    timeout: Duration,
}

impl Shutdown {
    pub fn new(timeout: Duration) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, timeout }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// How long in-flight requests get to finish after [`Shutdown::trigger`]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn trigger(&self) {
        info!("Initiating graceful shutdown");
        let _ = self.tx.send(());
    }

    /// Resolves once shutdown is triggered
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }
}
