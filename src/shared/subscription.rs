//! Push-style subscription handle shared by the identity provider and report store ports.
//!
//! A `Subscription<T>` is the receiving half of an unbounded channel plus an
//! optional handle to the task producing into it. Dropping the subscription is
//! the unsubscribe: the producer task is aborted and anything still queued is
//! discarded with the receiver.

use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    producer: Option<AbortHandle>,
}

impl<T> Subscription<T> {
    /// Create a subscription together with the sender its producer pushes into
    pub fn channel() -> (mpsc::UnboundedSender<T>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            sender,
            Self {
                receiver,
                producer: None,
            },
        )
    }

    /// Tie the producing task's lifetime to this subscription
    pub fn with_producer(mut self, producer: AbortHandle) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Forward a `watch` channel: the current value first, then every change
    pub fn from_watch(mut receiver: watch::Receiver<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let (sender, subscription) = Self::channel();

        let producer = tokio::spawn(async move {
            let current = receiver.borrow_and_update().clone();
            if sender.send(current).is_err() {
                return;
            }
            while receiver.changed().await.is_ok() {
                let next = receiver.borrow_and_update().clone();
                if sender.send(next).is_err() {
                    break;
                }
            }
        });

        subscription.with_producer(producer.abort_handle())
    }

    /// Wait for the next pushed item; `None` once the producer has gone away
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("has_producer", &self.producer.is_some())
            .finish()
    }
}
