//! Task ownership for one controller instance.
//!
//! # Invariants
//! - At most one live subscription per scope; `resubscribe` aborts the old one.
//! - After `cancel`, running tasks stop at their next await point and new
//!   launches are ignored.

use log::debug;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct ControllerScope {
    name: &'static str,
    token: CancellationToken,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl ControllerScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            token: CancellationToken::new(),
            subscription: Mutex::new(None),
        }
    }

    /// Runs one piece of intent work alongside any other in-flight work.
    ///
    /// # Panics
    /// - When called outside a tokio runtime.
    pub fn launch<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = self.spawn(work);
    }

    /// Replaces the live subscription with `work`.
    pub fn resubscribe<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = subscription.take() {
            previous.abort();
        }
        *subscription = self.spawn(work);
    }

    pub fn cancel(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        if let Some(handle) = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        debug!(
            "event=controller_closed module=controller controller={}",
            self.name
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn spawn<F>(&self, work: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.token.is_cancelled() {
            debug!(
                "event=task_rejected module=controller controller={} reason=cancelled",
                self.name
            );
            return None;
        }
        let token = self.token.clone();
        Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = work => {}
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerScope;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn resubscribe_aborts_previous_subscription() {
        let scope = ControllerScope::new("test");
        let (first_tx, first_rx) = oneshot::channel::<()>();
        scope.resubscribe(async move {
            let _keep = first_tx;
            std::future::pending::<()>().await;
        });
        tokio::task::yield_now().await;
        scope.resubscribe(async {});
        // Aborting drops the first future and with it the sender.
        let closed = tokio::time::timeout(Duration::from_secs(1), first_rx).await;
        assert!(matches!(closed, Ok(Err(_))));
    }

    #[tokio::test]
    async fn cancel_stops_launched_work_and_rejects_new_work() {
        let scope = ControllerScope::new("test");
        let (tx, rx) = oneshot::channel::<()>();
        scope.launch(async move {
            let _keep = tx;
            std::future::pending::<()>().await;
        });
        scope.cancel();
        let closed = tokio::time::timeout(Duration::from_secs(1), rx).await;
        assert!(matches!(closed, Ok(Err(_))));

        let (late_tx, late_rx) = oneshot::channel::<()>();
        scope.launch(async move {
            let _ = late_tx.send(());
        });
        let late = tokio::time::timeout(Duration::from_secs(1), late_rx).await;
        assert!(matches!(late, Ok(Err(_))));
        assert!(scope.is_cancelled());
    }
}
