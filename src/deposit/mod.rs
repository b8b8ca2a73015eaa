//! Source-chain deposit construction and submission.
//!
//! An EVM deposit is built but never broadcast here: the engine returns the
//! sponsored multicall calldata for the relayer to submit, keyed by the hash
//! of that calldata. A Noble deposit is signed and broadcast directly, since
//! the Noble account pays its own fees in uusdc.

pub mod evm;
pub mod noble;
pub mod permit;

use std::time::Duration;

use alloy_provider::Provider;
use alloy_signer_local::PrivateKeySigner;
use chrono::Utc;

use crate::clients::Clients;
use crate::error::Result;
use crate::fees::FeeEstimator;
use crate::message::{Call, MessageKey, ReceiveMessage, Status};
use crate::path::Path;
use crate::protocol::receipt::DepositEvents;

/// How long to wait for Noble to index a broadcast burn.
const NOBLE_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// What a deposit produced: an idempotency key, the calls recorded for later
/// replay, and the burn events when the deposit already landed on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    /// On EVM, the keccak-256 of the multicall calldata for sponsored
    /// deposits or the transaction hash for direct ones; on Noble, the
    /// broadcast transaction hash.
    pub hash: String,
    pub calls: Vec<Call>,
    pub events: Option<DepositEvents>,
}

/// Execute a burn on the source chain and produce the transfer record the
/// relay pipeline will carry to completion.
///
/// With a `signer` the EVM leg is sponsored: the user's key signs a permit,
/// nothing is broadcast, and the record enters the pipeline as `waiting`
/// with the deferred call attached. Without one the relayer submits
/// directly and the record starts at `pending` with its burn events parsed.
pub async fn deposit_for_burn_with_caller(
    clients: &Clients,
    path: &Path,
    signer: Option<&PrivateKeySigner>,
) -> Result<ReceiveMessage> {
    path.validate()?;

    let mut resolved = path.clone();
    resolved.receiver_address = FeeEstimator::new(clients)
        .resolve_receiver(&path.receiver_address, path.to_chain.is_testnet())
        .await?;

    let outcome = if resolved.from_chain.is_noble() {
        let outcome = noble::deposit(clients, &resolved).await?;
        let events = clients
            .noble
            .tx_events(&outcome.hash, NOBLE_RECEIPT_TIMEOUT)
            .await
            .and_then(|events| DepositEvents::from_cosmos_events(&events))?;
        DepositOutcome {
            events: Some(events),
            ..outcome
        }
    } else if let Some(signer) = signer {
        evm::deposit(clients, &resolved, signer).await?
    } else {
        evm::deposit_direct(clients, &resolved).await?
    };

    let destination_height = if resolved.to_chain.is_evm() {
        clients.evm(resolved.to_chain)?.get_block_number().await?
    } else {
        0
    };

    let status = if outcome.events.is_some() {
        Status::Pending
    } else {
        Status::Waiting
    };
    let events = outcome.events;
    Ok(ReceiveMessage::builder()
        .key(MessageKey::new(&outcome.hash))
        .status(status)
        .maybe_nonce(events.as_ref().map(|e| e.nonce))
        .maybe_message_bytes(events.as_ref().map(|e| e.message.clone()))
        .maybe_message_hash(events.as_ref().map(|e| e.message_hash))
        .block_confirmation_in_ms(resolved.from_chain.confirmation_delay().as_millis() as u64)
        .destination_block_height_at_deposit(destination_height)
        .original_path(resolved)
        .calls(outcome.calls)
        .submitted_at(Utc::now())
        .build())
}
