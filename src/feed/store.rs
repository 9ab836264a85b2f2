//! Entry Store Abstraction
//!
//! The three operations the feed needs from a store (read newest, insert,
//! subscribe to inserts) and the handle returned by a subscription.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::StoreResult;
use super::types::{FeedEntry, NewEntry};

/// Events buffered per subscription before the producer waits
pub const SUBSCRIPTION_BUFFER: usize = 256;

/// A table of feed entries with an insert notification channel
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Most recent entries, newest first, at most `limit`
    async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>>;

    /// Insert an entry; the store assigns id and timestamp
    async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry>;

    /// Open a subscription to insert events.
    ///
    /// Every insert completed after this returns is delivered.
    async fn subscribe(&self) -> StoreResult<Subscription>;
}

#[async_trait]
impl<S: EntryStore + ?Sized> EntryStore for Arc<S> {
    async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
        (**self).recent(limit).await
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
        (**self).insert(entry).await
    }

    async fn subscribe(&self) -> StoreResult<Subscription> {
        (**self).subscribe().await
    }
}

/// Cancellable stream of inserted entries.
///
/// A producer task feeds a bounded channel; closing the subscription stops
/// the producer and discards anything still buffered. Dropping closes it.
pub struct Subscription {
    events: mpsc::Receiver<FeedEntry>,
    producer: Option<JoinHandle<()>>,
    closed: bool,
}

impl Subscription {
    /// Spawn `producer` with the sending half of a fresh channel
    pub fn spawn<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(mpsc::Sender<FeedEntry>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let handle = tokio::spawn(producer(tx));

        Self {
            events: rx,
            producer: Some(handle),
            closed: false,
        }
    }

    /// Next inserted entry, or `None` once closed or the source has ended
    pub async fn next(&mut self) -> Option<FeedEntry> {
        if self.closed {
            return None;
        }
        self.events.recv().await
    }

    /// Stop delivery immediately. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.events.close();
        while self.events.try_recv().is_ok() {}

        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
