//! Destination-chain mint submission.
//!
//! Both receivers are idempotent against the protocol's own nonce tracking:
//! a message whose nonce is already spent reports success with no new
//! transaction instead of failing the pipeline.

pub mod evm;
pub mod noble;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;

use crate::chain::Chain;
use crate::clients::{with_receipt_deadline, Clients};
use crate::error::{PathwayError, Result};
use crate::message::ReceiveMessage;
use crate::spans;

/// How a receive attempt concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Mint landed; the destination transaction hash.
    Submitted(String),
    /// The nonce was already spent, by us or anyone else.
    AlreadyReceived,
}

/// Submits prepared calldata to an EVM chain and waits for inclusion.
///
/// The direct implementation signs with the relayer wallet; sponsored
/// execution services implement the same seam externally.
#[async_trait]
pub trait CallSubmitter: Send + Sync {
    /// Returns the hash of the included transaction.
    async fn submit(&self, chain: Chain, to: Address, calldata: Bytes) -> Result<String>;
}

/// [`CallSubmitter`] that broadcasts from the relayer wallet.
pub struct DirectSubmitter<'a> {
    clients: &'a Clients,
}

impl<'a> DirectSubmitter<'a> {
    pub fn new(clients: &'a Clients) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl CallSubmitter for DirectSubmitter<'_> {
    async fn submit(&self, chain: Chain, to: Address, calldata: Bytes) -> Result<String> {
        let provider = self.clients.evm_signer(chain)?;
        let tx = TransactionRequest::default().with_to(to).with_input(calldata);
        let pending = provider.send_transaction(tx).await?;
        let span = spans::wait_for_confirmation(*pending.tx_hash(), &chain);
        let _guard = span.enter();
        let receipt = with_receipt_deadline(pending.get_receipt()).await?;
        if !receipt.status() {
            return Err(PathwayError::TransactionFailed {
                reason: format!("transaction reverted: {}", receipt.transaction_hash),
            });
        }
        Ok(receipt.transaction_hash.to_string())
    }
}

/// Submit the attested message on its destination chain with the relayer's
/// own wallet.
pub async fn receive(clients: &Clients, record: &ReceiveMessage) -> Result<ReceiveOutcome> {
    receive_with(clients, record, &DirectSubmitter::new(clients)).await
}

/// Submit the attested message, routing EVM calldata through `submitter`.
pub async fn receive_with(
    clients: &Clients,
    record: &ReceiveMessage,
    submitter: &dyn CallSubmitter,
) -> Result<ReceiveOutcome> {
    let destination = record.original_path.to_chain;
    if destination.is_noble() {
        noble::receive(clients, record).await
    } else {
        evm::receive(clients, record, submitter).await
    }
}
