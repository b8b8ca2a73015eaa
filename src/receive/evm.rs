//! Attested mints on EVM destination chains.

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::Filter;
use alloy_sol_types::{SolEvent, SolValue};
use tracing::{info, warn};

use crate::clients::Clients;
use crate::contracts::IMessageTransmitter;
use crate::error::{PathwayError, Result};
use crate::message::ReceiveMessage;
use crate::spans;

use super::{CallSubmitter, ReceiveOutcome};

/// Key the transmitter tracks spent nonces under.
pub fn nonce_hash(source_domain: u32, nonce: u64) -> B256 {
    keccak256((source_domain, nonce).abi_encode_packed())
}

/// Submit `receiveMessage` through a [`CallSubmitter`].
///
/// The spent-nonce check runs first so a redelivered record, or a mint
/// front-run by another relayer, resolves without a reverting transaction.
pub async fn receive(
    clients: &Clients,
    record: &ReceiveMessage,
    submitter: &dyn CallSubmitter,
) -> Result<ReceiveOutcome> {
    let destination = record.original_path.to_chain;
    let attestation = record
        .circle_attestation
        .clone()
        .ok_or(PathwayError::AttestationNotReady)?;

    let span = spans::receive_message(&record.message_hash, &destination, attestation.len());
    let _guard = span.enter();

    let provider = clients.evm(destination)?;
    let transmitter_address = destination.message_transmitter()?;
    let transmitter = IMessageTransmitter::new(transmitter_address, provider);

    let source_domain = record.original_path.from_chain.domain();
    let spent = transmitter
        .usedNonces(nonce_hash(source_domain, record.nonce))
        .call()
        .await?;
    if spent != U256::ZERO {
        warn!(nonce = record.nonce, "nonce already spent, skipping mint");
        return Ok(ReceiveOutcome::AlreadyReceived);
    }

    let calldata = receive_calldata(record.message_bytes.clone(), attestation);
    let hash = submitter
        .submit(destination, transmitter_address, calldata)
        .await?;
    info!(tx_hash = %hash, chain = %destination, "mint confirmed");
    Ok(ReceiveOutcome::Submitted(hash))
}

/// Look for a `MessageReceived` event matching this record's nonce, scanning
/// forward from the block height observed at deposit time.
///
/// Used to reconcile records whose mint may have landed without the store
/// hearing about it.
pub async fn find_received_event(
    clients: &Clients,
    record: &ReceiveMessage,
) -> Result<Option<String>> {
    let destination = record.original_path.to_chain;
    let provider = clients.evm(destination)?;

    let filter = Filter::new()
        .address(destination.message_transmitter()?)
        .event_signature(IMessageTransmitter::MessageReceived::SIGNATURE_HASH)
        .topic2(U256::from(record.nonce))
        .from_block(record.destination_block_height_at_deposit);

    let source_domain = record.original_path.from_chain.domain();
    for log in provider.get_logs(&filter).await? {
        let event = IMessageTransmitter::MessageReceived::decode_log(&log.inner)?;
        if event.sourceDomain == source_domain {
            return Ok(log.transaction_hash.map(|h| h.to_string()));
        }
    }
    Ok(None)
}

/// Raw `receiveMessage` calldata, recorded with submissions for replay.
pub fn receive_calldata(message: Bytes, attestation: Bytes) -> Bytes {
    use alloy_sol_types::SolCall;
    Bytes::from(
        IMessageTransmitter::receiveMessageCall {
            message,
            attestation,
        }
        .abi_encode(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn nonce_hash_packs_domain_and_nonce() {
        // keccak of the 12-byte packed (uint32 domain, uint64 nonce)
        let mut packed = Vec::new();
        packed.extend_from_slice(&4u32.to_be_bytes());
        packed.extend_from_slice(&273585u64.to_be_bytes());
        assert_eq!(nonce_hash(4, 273585), keccak256(&packed));
    }

    #[test]
    fn receive_calldata_has_expected_selector() {
        let calldata = receive_calldata(Bytes::from(vec![1u8; 248]), Bytes::from(vec![2u8; 130]));
        // receiveMessage(bytes,bytes)
        assert_eq!(hex::encode(&calldata[..4]), "57ecfd28");
    }
}
