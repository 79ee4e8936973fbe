use crate::{models::PaymentRecord, services::PaymentStream};
use futures::StreamExt;
use std::future::Future;
use tokio::task::JoinHandle;

/// A live `NewMemo` listener. Released on `unsubscribe()` or drop.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Runs `on_payment` once per record, in arrival order.
    pub fn spawn<F, Fut>(mut stream: PaymentStream, on_payment: F) -> Self
    where
        F: Fn(PaymentRecord) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            while let Some(record) = stream.next().await {
                on_payment(record).await;
            }
            tracing::debug!("Payment subscription ended");
        });

        Self { handle }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
