//! Relay executor: submit attested mints on their destination chains.

use chrono::{Duration as ChronoDuration, Utc};
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::Result;
use crate::message::{MessageKey, ReceiveMessage, Status};
use crate::queue::MessageQueue;
use crate::receive::{self, ReceiveOutcome};
use crate::spans;
use crate::store::{MessageStore, StatusUpdate};

use super::{BatchReport, RelayContext};

pub async fn run<S, Q>(ctx: &RelayContext<S, Q>, batch: Vec<MessageKey>) -> BatchReport
where
    S: MessageStore,
    Q: MessageQueue,
{
    let span = spans::relay_stage("relay", batch.len());
    let _guard = span.enter();

    let results = join_all(batch.into_iter().map(|key| async {
        let outcome = relay_one(ctx, &key).await;
        (key, outcome)
    }))
    .await;

    let mut report = BatchReport::ok();
    for (key, outcome) in results {
        if let Err(e) = outcome {
            warn!(key = %key, error = %e, "relay bookkeeping failed");
            report.failures.push(key);
        }
    }
    report
}

/// Drive one record to `received`, or park it as `failed` with a retry time.
///
/// Store errors propagate (the key is redelivered); chain errors are
/// absorbed into the record's own retry state.
async fn relay_one<S, Q>(ctx: &RelayContext<S, Q>, key: &MessageKey) -> Result<()>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let Some(mut record) = ctx.store.get(key).await? else {
        warn!(key = %key, "queued key has no record, dropping");
        return Ok(());
    };

    // A retried record arrives as failed; walk it back through the
    // lifecycle before attempting the mint again.
    if record.status == Status::Failed {
        record = ctx.store.update(key, StatusUpdate::status(Status::Pending)).await?;
    }
    if record.status == Status::Pending && record.circle_attestation.is_some() {
        record = ctx.store.update(key, StatusUpdate::status(Status::Attested)).await?;
    }
    if record.status != Status::Attested {
        return Ok(());
    }

    // The mint may have landed in a previous attempt or via another
    // relayer; check the destination log before spending gas.
    if record.original_path.to_chain.is_evm() {
        if let Some(hash) = receive::evm::find_received_event(&ctx.clients, &record).await? {
            info!(key = %key, tx_hash = %hash, "mint already on chain");
            return mark_received(ctx, key, Some(hash)).await;
        }
    }

    match receive::receive(&ctx.clients, &record).await {
        Ok(ReceiveOutcome::Submitted(hash)) => mark_received(ctx, key, Some(hash)).await,
        Ok(ReceiveOutcome::AlreadyReceived) => mark_received(ctx, key, None).await,
        Err(e) => {
            spans::record_error(&e);
            mark_failed(ctx, key, &record, &e.to_string()).await
        }
    }
}

async fn mark_received<S, Q>(
    ctx: &RelayContext<S, Q>,
    key: &MessageKey,
    receive_hash: Option<String>,
) -> Result<()>
where
    S: MessageStore,
    Q: MessageQueue,
{
    ctx.store
        .update(
            key,
            StatusUpdate {
                status: Some(Status::Received),
                receive_hash,
                retry_at: Some(None),
                ..Default::default()
            },
        )
        .await?;
    Ok(())
}

async fn mark_failed<S, Q>(
    ctx: &RelayContext<S, Q>,
    key: &MessageKey,
    record: &ReceiveMessage,
    reason: &str,
) -> Result<()>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let retry_count = record.retry_count + 1;
    let retry_at = Utc::now() + ChronoDuration::milliseconds(ctx.relay.retry_delay_ms as i64);
    warn!(key = %key, retry_count, reason, "mint failed, scheduling retry");
    if retry_count > ctx.relay.retry_alert_threshold {
        warn!(
            key = %key,
            retry_count,
            threshold = ctx.relay.retry_alert_threshold,
            "record has exceeded the retry alert threshold"
        );
    }

    ctx.store
        .update(
            key,
            StatusUpdate {
                status: Some(Status::Failed),
                retry_at: Some(Some(retry_at)),
                retry_count: Some(retry_count),
                ..Default::default()
            },
        )
        .await?;
    Ok(())
}
