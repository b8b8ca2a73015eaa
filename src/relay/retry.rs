//! Retry stage: hand failed records back to the relay executor.
//!
//! Deliberately dumb: the executor owns all state handling, so this stage
//! just moves the batch from the retry queue to the relay queue. Keeping it
//! as its own stage preserves a place for per-retry policy later.

use tracing::debug;

use crate::message::MessageKey;
use crate::queue::{send_batch, MessageQueue};
use crate::spans;
use crate::store::MessageStore;

use super::{BatchReport, RelayContext};

pub async fn run<S, Q>(ctx: &RelayContext<S, Q>, batch: Vec<MessageKey>) -> BatchReport
where
    S: MessageStore,
    Q: MessageQueue,
{
    let span = spans::relay_stage("retry", batch.len());
    let _guard = span.enter();

    if batch.is_empty() {
        return BatchReport::ok();
    }
    debug!(count = batch.len(), "forwarding retries to the relay queue");

    match send_batch(&ctx.queues.relay, batch.clone()).await {
        Ok(()) => BatchReport::ok(),
        Err(_) => BatchReport { failures: batch },
    }
}
