//! Attestation stage: poll the attestation service for confirmed burns.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{PathwayError, Result};
use crate::message::{MessageKey, Status};
use crate::queue::MessageQueue;
use crate::spans;
use crate::store::{MessageStore, StatusUpdate};

use super::{BatchReport, RelayContext};

pub async fn run<S, Q>(ctx: &RelayContext<S, Q>, batch: Vec<MessageKey>) -> BatchReport
where
    S: MessageStore,
    Q: MessageQueue,
{
    let span = spans::relay_stage("attestation", batch.len());
    let _guard = span.enter();

    let results = join_all(batch.into_iter().map(|key| async {
        let outcome = poll_one(ctx, &key).await;
        (key, outcome)
    }))
    .await;

    let mut report = BatchReport::ok();
    for (key, outcome) in results {
        match outcome {
            Ok(()) => {}
            // Not ready yet: the scheduler's next sweep re-enqueues the
            // record, so this is not a delivery failure.
            Err(PathwayError::AttestationNotReady) => {
                debug!(key = %key, "attestation not ready");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "attestation poll failed");
                report.failures.push(key);
            }
        }
    }
    report
}

async fn poll_one<S, Q>(ctx: &RelayContext<S, Q>, key: &MessageKey) -> Result<()>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let Some(record) = ctx.store.get(key).await? else {
        warn!(key = %key, "queued key has no record, dropping");
        return Ok(());
    };
    if record.status != Status::Pending {
        return Ok(());
    }
    if record.message_hash.is_zero() {
        // Deposit receipt was never parsed; nothing to look up yet.
        return Ok(());
    }

    let span = spans::poll_attestation(
        key.as_str(),
        &record.original_path.from_chain,
        record.retry_count,
    );
    let _guard = span.enter();
    let attestation = ctx.clients.attestation.attestation(record.message_hash).await?;
    ctx.store
        .update(
            key,
            StatusUpdate {
                status: Some(Status::Attested),
                circle_attestation: Some(attestation),
                ..Default::default()
            },
        )
        .await?;
    ctx.queues.relay.send(vec![key.clone()]).await?;
    info!(key = %key, "attestation complete");
    Ok(())
}
