//! Execution stage: submit deferred sponsored deposits.
//!
//! A `waiting` record carries the multicall calldata its user signed for.
//! This stage broadcasts it with the relayer wallet, waits for the receipt,
//! and promotes the record to `pending` with the burn events parsed out. A
//! receipt with no valid burn means the calldata never was a deposit, and
//! the record is deleted rather than retried forever.

use alloy_network::TransactionBuilder;
use alloy_primitives::{hex, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use futures::future::join_all;
use tracing::{info, warn};

use crate::clients::with_receipt_deadline;
use crate::message::{CallKind, MessageKey, ReceiveMessage, Status};
use crate::protocol::receipt::DepositEvents;
use crate::queue::MessageQueue;
use crate::spans;
use crate::store::{MessageStore, StatusUpdate};
use crate::error::{PathwayError, Result};

use super::{BatchReport, RelayContext};

pub async fn run<S, Q>(ctx: &RelayContext<S, Q>, batch: Vec<MessageKey>) -> BatchReport
where
    S: MessageStore,
    Q: MessageQueue,
{
    let span = spans::relay_stage("execution", batch.len());
    let _guard = span.enter();

    let results = join_all(batch.into_iter().map(|key| async {
        let outcome = execute_one(ctx, &key).await;
        (key, outcome)
    }))
    .await;

    let mut report = BatchReport::ok();
    for (key, outcome) in results {
        if let Err(e) = outcome {
            warn!(key = %key, error = %e, "deposit execution failed");
            report.failures.push(key);
        }
    }
    report
}

async fn execute_one<S, Q>(ctx: &RelayContext<S, Q>, key: &MessageKey) -> Result<()>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let Some(record) = ctx.store.get(key).await? else {
        warn!(key = %key, "queued key has no record, dropping");
        return Ok(());
    };
    if record.status != Status::Waiting {
        return Ok(());
    }

    let events = match submit_calls(ctx, &record).await {
        Ok(events) => events,
        Err(e @ PathwayError::MessageCodec { .. }) => {
            // The calldata executed but produced no burn. Nothing to relay.
            warn!(key = %key, error = %e, "no burn events in receipt, deleting record");
            ctx.store.delete(key).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let destination = record.original_path.to_chain;
    let destination_height = if destination.is_evm() {
        ctx.clients.evm(destination)?.get_block_number().await?
    } else {
        0
    };

    ctx.store
        .update(
            key,
            StatusUpdate {
                status: Some(Status::Pending),
                nonce: Some(events.nonce),
                message_bytes: Some(events.message),
                message_hash: Some(events.message_hash),
                destination_block_height_at_deposit: Some(destination_height),
                ..Default::default()
            },
        )
        .await?;
    info!(key = %key, nonce = events.nonce, "sponsored deposit confirmed");
    Ok(())
}

async fn submit_calls<S, Q>(
    ctx: &RelayContext<S, Q>,
    record: &ReceiveMessage,
) -> Result<DepositEvents>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let mut calls = record.calls.clone();
    calls.sort_by_key(|call| call.order);

    let mut events = None;
    for call in calls {
        if call.kind != CallKind::Contract {
            continue;
        }
        let calldata: Bytes = hex::decode(&call.data)?.into();
        let provider = ctx.clients.evm_signer(call.chain)?;
        let multicaller = ctx.clients.multicaller(call.chain)?;

        let tx = TransactionRequest::default()
            .with_to(multicaller)
            .with_input(calldata);
        let pending = provider.send_transaction(tx).await?;
        let wait_span = spans::wait_for_confirmation(*pending.tx_hash(), &call.chain);
        let wait_guard = wait_span.enter();
        let receipt = with_receipt_deadline(pending.get_receipt()).await?;
        drop(wait_guard);
        if !receipt.status() {
            return Err(PathwayError::TransactionFailed {
                reason: format!("sponsored call reverted: {}", receipt.transaction_hash),
            });
        }
        let parse_span =
            spans::parse_deposit_receipt(record.key.as_str(), &record.original_path.from_chain);
        let _parse_guard = parse_span.enter();
        // A successful receipt without burn events means the call was not a
        // deposit; classify it as a codec problem so the caller can drop it.
        events = Some(DepositEvents::from_evm_receipt(&receipt).map_err(|e| {
            PathwayError::MessageCodec {
                reason: e.to_string(),
            }
        })?);
    }

    events.ok_or_else(|| PathwayError::MessageCodec {
        reason: "record has no contract calls to execute".to_string(),
    })
}
