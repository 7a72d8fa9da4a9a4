//! Cancellation of in-flight finality waits.
//!
//! Cancelling only stops the caller from waiting. A transaction that already
//! reached the ledger stays there.

use tokio::sync::watch;

/// Owner side: trigger cancellation for every token handed out.
pub struct Cancellation {
    tx: watch::Sender<bool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Get a token that resolves once [`cancel`](Self::cancel) is called.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiter side, cheap to clone.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancelled. Never resolves if the owner is dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_notifies_tokens() {
        let cancellation = Cancellation::new();
        let a = cancellation.token();
        let b = a.clone();
        cancellation.cancel();
        a.cancelled().await;
        b.cancelled().await;
        assert!(a.is_cancelled());
        assert!(cancellation.is_cancelled());
    }

    #[tokio::test]
    async fn token_taken_after_cancel_is_cancelled() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        assert!(cancellation.token().is_cancelled());
    }

    #[tokio::test]
    async fn never_token_does_not_resolve() {
        let token = CancelToken::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
