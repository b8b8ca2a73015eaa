//! Work queues between relay stages.
//!
//! Queue bodies are just message keys; every stage re-reads the record from
//! the store so redelivery is always safe. Batch sends are chunked to ten
//! entries to match hosted queue APIs.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::message::MessageKey;

/// Largest batch a single send may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// A named stage queue.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Enqueue one batch of at most [`MAX_BATCH_SIZE`] keys.
    async fn send(&self, keys: Vec<MessageKey>) -> Result<()>;

    /// Pull up to `max` keys off the queue.
    async fn receive(&self, max: usize) -> Result<Vec<MessageKey>>;
}

/// Send an arbitrarily large batch in chunks of [`MAX_BATCH_SIZE`].
pub async fn send_batch<Q: MessageQueue + ?Sized>(queue: &Q, keys: Vec<MessageKey>) -> Result<()> {
    for chunk in keys.chunks(MAX_BATCH_SIZE) {
        queue.send(chunk.to_vec()).await?;
    }
    Ok(())
}

/// The four logical queues the pipeline runs on.
pub struct Queues<Q: MessageQueue> {
    /// Deferred sponsored deposits awaiting submission.
    pub execution: Q,
    /// Confirmed burns awaiting their attestation.
    pub attestation: Q,
    /// Attested messages awaiting the destination mint.
    pub relay: Q,
    /// Failed records due for another attempt.
    pub retry: Q,
}

/// Unbounded FIFO queue for tests and local runs.
#[derive(Default)]
pub struct InMemoryQueue {
    entries: Mutex<VecDeque<MessageKey>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn send(&self, keys: Vec<MessageKey>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.extend(keys);
        Ok(())
    }

    async fn receive(&self, max: usize) -> Result<Vec<MessageKey>> {
        let mut entries = self.entries.lock().await;
        let take = max.min(entries.len());
        Ok(entries.drain(..take).collect())
    }
}

impl Queues<InMemoryQueue> {
    pub fn in_memory() -> Self {
        Self {
            execution: InMemoryQueue::new(),
            attestation: InMemoryQueue::new(),
            relay: InMemoryQueue::new(),
            retry: InMemoryQueue::new(),
        }
    }
}
