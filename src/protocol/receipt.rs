//! Deposit receipt parsing.
//!
//! A confirmed burn emits two events the relay pipeline needs: `MessageSent`
//! with the raw message bytes, and `DepositForBurn` with the nonce and
//! destination domain. The same shape is extracted from EVM logs and from
//! Cosmos ABCI events so the rest of the pipeline is source-agnostic.

use alloy_primitives::{keccak256, Bytes, FixedBytes};
use alloy_rpc_types::TransactionReceipt;
use alloy_sol_types::SolEvent;
use base64::Engine;

use crate::contracts::{IMessageTransmitter, ITokenMessenger};
use crate::error::{PathwayError, Result};

const COSMOS_MESSAGE_SENT: &str = "circle.cctp.v1.MessageSent";
const COSMOS_DEPOSIT_FOR_BURN: &str = "circle.cctp.v1.DepositForBurn";

/// The burn events extracted from a confirmed deposit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvents {
    /// Raw message bytes from the `MessageSent` event.
    pub message: Bytes,
    /// keccak-256 of the message bytes, the attestation lookup key.
    pub message_hash: FixedBytes<32>,
    /// Nonce assigned to the burn on the source chain.
    pub nonce: u64,
    /// CCTP domain the transfer is headed to.
    pub destination_domain: u32,
}

impl DepositEvents {
    /// Extract the burn events from an EVM transaction receipt.
    pub fn from_evm_receipt(receipt: &TransactionReceipt) -> Result<Self> {
        let logs = receipt.inner.logs();

        let message_sent = logs
            .iter()
            .find(|log| log.topic0() == Some(&IMessageTransmitter::MessageSent::SIGNATURE_HASH))
            .ok_or_else(|| PathwayError::TransactionFailed {
                reason: format!(
                    "MessageSent event not found in {} transaction logs",
                    logs.len()
                ),
            })?;
        let (message,) = IMessageTransmitter::MessageSent::abi_decode_data(
            &message_sent.data().data,
        )?;

        let deposit_for_burn = logs
            .iter()
            .find(|log| log.topic0() == Some(&ITokenMessenger::DepositForBurn::SIGNATURE_HASH))
            .ok_or_else(|| PathwayError::TransactionFailed {
                reason: "DepositForBurn event not found in transaction logs".to_string(),
            })?;
        let decoded = ITokenMessenger::DepositForBurn::decode_log(&deposit_for_burn.inner)?;

        let message_hash = keccak256(&message);
        Ok(Self {
            message,
            message_hash,
            nonce: decoded.nonce,
            destination_domain: decoded.destinationDomain,
        })
    }

    /// Extract the burn events from the ABCI events of a committed Noble
    /// transaction.
    ///
    /// Cosmos proto events JSON-encode attribute values, so uint64 fields
    /// arrive quoted and uint32 fields do not; both forms are accepted.
    pub fn from_cosmos_events(events: &[tendermint::abci::Event]) -> Result<Self> {
        let message_b64 = attribute(events, COSMOS_MESSAGE_SENT, "message")?;
        let message_bytes = base64::engine::general_purpose::STANDARD
            .decode(strip_quotes(&message_b64))
            .map_err(|e| PathwayError::MessageCodec {
                reason: format!("MessageSent attribute is not base64: {e}"),
            })?;

        let nonce = parse_numeric_attribute(events, COSMOS_DEPOSIT_FOR_BURN, "nonce")?;
        let destination_domain =
            parse_numeric_attribute(events, COSMOS_DEPOSIT_FOR_BURN, "destination_domain")? as u32;

        let message = Bytes::from(message_bytes);
        let message_hash = keccak256(&message);
        Ok(Self {
            message,
            message_hash,
            nonce,
            destination_domain,
        })
    }
}

fn attribute(
    events: &[tendermint::abci::Event],
    event_type: &str,
    key: &str,
) -> Result<String> {
    events
        .iter()
        .filter(|event| event.kind == event_type)
        .flat_map(|event| event.attributes.iter())
        .find(|attr| attr.key_str().is_ok_and(|k| k == key))
        .and_then(|attr| attr.value_str().ok().map(str::to_string))
        .ok_or_else(|| PathwayError::TransactionFailed {
            reason: format!("{event_type} event missing attribute {key}"),
        })
}

fn parse_numeric_attribute(
    events: &[tendermint::abci::Event],
    event_type: &str,
    key: &str,
) -> Result<u64> {
    let raw = attribute(events, event_type, key)?;
    strip_quotes(&raw)
        .parse()
        .map_err(|_| PathwayError::MessageCodec {
            reason: format!("{event_type}.{key} is not numeric: {raw}"),
        })
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
