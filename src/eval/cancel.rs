use std::sync::Arc;

use tokio::sync::watch;

/// Host side of a cancellation pair. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Stops every chain observing the paired [`Cancellation`] before its
    /// next step. Steps already dispatched are not rolled back.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Evaluator side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A cancellation that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let signalled = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if signalled.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}

pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, Cancellation { rx })
}
