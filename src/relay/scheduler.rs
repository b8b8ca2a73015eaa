//! Periodic sweep that feeds the stage queues from the store.

use chrono::{Duration as ChronoDuration, Utc};
use tracing::debug;

use crate::error::Result;
use crate::message::Status;
use crate::queue::{send_batch, MessageQueue};
use crate::spans;
use crate::store::MessageStore;

use super::{BatchReport, RelayContext};

/// Scan the store and enqueue every record that is due for its next stage.
///
/// - `waiting` records go to the execution queue.
/// - `pending` records whose source-chain confirmation window has elapsed go
///   to the attestation queue.
/// - `failed` records whose `retry_at` has passed go to the retry queue.
pub async fn run<S, Q>(ctx: &RelayContext<S, Q>) -> Result<BatchReport>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let now = Utc::now();

    let waiting = ctx.store.scan_by_status(Status::Waiting).await?;
    let span = spans::relay_stage("scheduler", waiting.len());
    let _guard = span.enter();

    let keys: Vec<_> = waiting.into_iter().map(|record| record.key).collect();
    if !keys.is_empty() {
        debug!(count = keys.len(), "scheduling deferred deposits");
        send_batch(&ctx.queues.execution, keys).await?;
    }

    let confirmed: Vec<_> = ctx
        .store
        .scan_by_status(Status::Pending)
        .await?
        .into_iter()
        .filter(|record| {
            let window = ChronoDuration::milliseconds(record.block_confirmation_in_ms as i64);
            record.submitted_at + window < now
        })
        .map(|record| record.key)
        .collect();
    if !confirmed.is_empty() {
        debug!(count = confirmed.len(), "scheduling attestation polls");
        send_batch(&ctx.queues.attestation, confirmed).await?;
    }

    let due: Vec<_> = ctx
        .store
        .scan_by_status(Status::Failed)
        .await?
        .into_iter()
        .filter(|record| record.retry_at.map_or(true, |at| at <= now))
        .map(|record| record.key)
        .collect();
    if !due.is_empty() {
        debug!(count = due.len(), "scheduling retries");
        send_batch(&ctx.queues.retry, due).await?;
    }

    Ok(BatchReport::ok())
}
