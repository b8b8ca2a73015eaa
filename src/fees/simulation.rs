//! Speculative gas estimation via `eth_estimateGas` state overrides.
//!
//! Quoting happens before any transaction exists, so the estimators build a
//! synthetic version of the transaction they are pricing and patch contract
//! storage so it would succeed:
//!
//! - For the destination-side mint, a fabricated burn message is signed by
//!   two ephemeral keys, and the MessageTransmitter's storage is overridden
//!   so those keys form the entire enabled attester set (threshold 2), with
//!   the synthetic nonce marked unused.
//! - For the source-side sponsored burn, a throwaway sender signs a permit
//!   and its USDC balance slot is overridden to cover the transfer.
//!
//! Storage slot positions follow the deployed USDC and MessageTransmitter
//! layouts: balances at slot 9, usedNonces at slot 10, signatureThreshold at
//! slot 4, the attester array at slot 5, enabledAttesters at slot 6.

use alloy_network::TransactionBuilder;
use alloy_primitives::map::B256HashMap;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::state::{AccountOverride, StateOverride};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolValue};
use tracing::debug;

use crate::chain::Chain;
use crate::contracts::IMessageTransmitter;
use crate::error::{PathwayError, Result};
use crate::path::Path;
use crate::protocol::address::bytes32_for_chain;
use crate::protocol::message::{BurnMessage, BurnMessageBody, MessageHeader};
use crate::spans;

/// Nonce used for every synthetic receive message. Any value works as long
/// as the matching usedNonces slot is overridden to zero.
pub(crate) const SYNTHETIC_NONCE: u64 = 273585;

/// USDC `balanceOf` mapping slot.
const USDC_BALANCES_SLOT: u64 = 9;
/// MessageTransmitter `signatureThreshold` slot.
const THRESHOLD_SLOT: u64 = 4;
/// MessageTransmitter `enabledAttesters` array slot.
const ATTESTERS_SLOT: u64 = 5;
/// MessageTransmitter attester membership mapping slot.
const ATTESTER_ENABLED_SLOT: u64 = 6;
/// MessageTransmitter `usedNonces` mapping slot.
const USED_NONCES_SLOT: u64 = 10;

/// Storage slot of `owner`'s USDC balance.
pub fn usdc_balance_slot(owner: Address) -> B256 {
    keccak256((owner, U256::from(USDC_BALANCES_SLOT)).abi_encode())
}

/// Storage slot marking a (source domain, nonce) pair as spent.
pub fn used_nonce_slot(source_domain: u32, nonce: u64) -> B256 {
    let source_and_nonce = keccak256((source_domain, nonce).abi_encode_packed());
    keccak256((source_and_nonce, U256::from(USED_NONCES_SLOT)).abi_encode())
}

fn attester_array_data_slot() -> U256 {
    U256::from_be_bytes(keccak256(U256::from(ATTESTERS_SLOT).abi_encode()).0)
}

fn attester_enabled_slot(attester: Address) -> B256 {
    keccak256((attester, U256::from(ATTESTER_ENABLED_SLOT)).abi_encode())
}

/// Throwaway signer from a fixed scalar. Deterministic so estimates are
/// reproducible across calls.
fn ephemeral_signer(scalar: u128) -> Result<PrivateKeySigner> {
    PrivateKeySigner::from_bytes(&B256::from(U256::from(scalar))).map_err(|e| {
        PathwayError::GasEstimation {
            reason: format!("failed to build ephemeral signer: {e}"),
        }
    })
}

/// Build the synthetic burn message a quote simulates receiving.
pub(crate) fn synthetic_burn_message(path: &Path) -> Result<BurnMessage> {
    let from = path.from_chain;
    let to = path.to_chain;
    Ok(BurnMessage {
        header: MessageHeader {
            version: 0,
            source_domain: from.domain(),
            destination_domain: to.domain(),
            nonce: SYNTHETIC_NONCE,
            sender: from.token_messenger().into_word(),
            recipient: to.token_messenger().into_word(),
            destination_caller: to.destination_caller_address()?.into_word(),
        },
        body: BurnMessageBody {
            version: 0,
            burn_token: from.usdc_token32(),
            mint_recipient: bytes32_for_chain(to, &path.receiver_address)?,
            amount: path.amount,
            message_sender: bytes32_for_chain(from, &path.sender_address)?,
        },
    })
}

/// Sign the message hash with both ephemeral attesters and concatenate the
/// signatures the way the transmitter expects.
fn synthetic_attestation(
    message_hash: B256,
    attesters: &[PrivateKeySigner],
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(65 * attesters.len());
    for attester in attesters {
        let signature = attester.sign_hash_sync(&message_hash)?;
        out.extend_from_slice(&signature.as_bytes());
    }
    Ok(out)
}

/// Storage overrides that make the transmitter accept the two ephemeral
/// attesters as its full signer set.
fn transmitter_overrides(
    source_domain: u32,
    attesters: &[PrivateKeySigner],
) -> B256HashMap<B256> {
    let mut diff = B256HashMap::default();
    diff.insert(
        used_nonce_slot(source_domain, SYNTHETIC_NONCE),
        B256::ZERO,
    );
    diff.insert(
        B256::from(U256::from(THRESHOLD_SLOT)),
        B256::from(U256::from(attesters.len() as u64)),
    );
    let array_slot = attester_array_data_slot();
    for (i, attester) in attesters.iter().enumerate() {
        diff.insert(
            B256::from(array_slot + U256::from(i as u64)),
            attester.address().into_word(),
        );
        diff.insert(
            attester_enabled_slot(attester.address()),
            B256::from(U256::from(1u8)),
        );
    }
    diff
}

/// Gas consumed by a `receiveMessage` for this path on its destination
/// chain, estimated against patched transmitter state.
pub async fn receive_gas(provider: &DynProvider, path: &Path) -> Result<u64> {
    let to = path.to_chain;
    let span = spans::simulate_receive(&to);
    let _guard = span.enter();

    let attesters = [ephemeral_signer(10_000_000_000_000_000_000)?, ephemeral_signer(1_000_000_000_000_000_000)?];

    let message = synthetic_burn_message(path)?;
    let message_bytes = message.encode();
    let attestation = synthetic_attestation(keccak256(&message_bytes), &attesters)?;

    let calldata = IMessageTransmitter::receiveMessageCall {
        message: message_bytes,
        attestation: Bytes::from(attestation),
    }
    .abi_encode();

    let transmitter = to.message_transmitter()?;
    let caller = to.destination_caller_address()?;

    let overrides = StateOverride::from_iter([
        (
            transmitter,
            AccountOverride {
                state_diff: Some(transmitter_overrides(path.from_chain.domain(), &attesters)),
                ..Default::default()
            },
        ),
        (
            caller,
            AccountOverride {
                balance: Some(U256::from(1_000_000_000_000_000_000u128)),
                ..Default::default()
            },
        ),
    ]);

    let tx = TransactionRequest::default()
        .with_from(caller)
        .with_to(transmitter)
        .with_input(calldata);

    let gas = provider.estimate_gas(tx).overrides(overrides).await?;
    debug!(gas, chain = %to, "receive gas estimated");
    Ok(gas)
}

/// Gas consumed by the sponsored burn on the source chain, estimated with a
/// throwaway sender whose USDC balance slot is patched to cover the amount.
pub async fn deposit_gas(
    provider: &DynProvider,
    chain: Chain,
    multicall_data: Bytes,
    multicaller: Address,
    synthetic_sender: Address,
    amount: U256,
) -> Result<u64> {
    let caller = chain.destination_caller_address()?;
    let overrides = StateOverride::from_iter([(
        chain.usdc_address()?,
        AccountOverride {
            state_diff: Some(B256HashMap::from_iter([(
                usdc_balance_slot(synthetic_sender),
                B256::from(amount),
            )])),
            ..Default::default()
        },
    )]);

    let tx = TransactionRequest::default()
        .with_from(caller)
        .with_to(multicaller)
        .with_input(multicall_data);

    let gas = provider.estimate_gas(tx).overrides(overrides).await?;
    debug!(gas, chain = %chain, "deposit gas estimated");
    Ok(gas)
}

/// The deterministic throwaway sender used for deposit estimation.
pub(crate) fn synthetic_deposit_signer() -> Result<PrivateKeySigner> {
    ephemeral_signer(10_000_000_000_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn slot_derivations_are_stable() {
        let owner = address!("eB4EaE8072bF3e2608f05B6812CD95133BF71504");
        // mapping(address => uint256) at slot 9: keccak(abi.encode(key, 9))
        let expected = keccak256((owner, U256::from(9u64)).abi_encode());
        assert_eq!(usdc_balance_slot(owner), expected);

        let hashed = keccak256((4u32, 273585u64).abi_encode_packed());
        let expected = keccak256((hashed, U256::from(10u64)).abi_encode());
        assert_eq!(used_nonce_slot(4, 273585), expected);
    }

    #[test]
    fn packed_source_and_nonce_is_twelve_bytes() {
        let packed = (4u32, 273585u64).abi_encode_packed();
        assert_eq!(packed.len(), 12);
    }

    #[test]
    fn ephemeral_signers_are_deterministic() {
        let a = ephemeral_signer(10_000_000_000_000_000_000).unwrap();
        let b = ephemeral_signer(10_000_000_000_000_000_000).unwrap();
        assert_eq!(a.address(), b.address());

        let c = ephemeral_signer(1_000_000_000_000_000_000).unwrap();
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn transmitter_overrides_cover_nonce_threshold_and_attesters() {
        let attesters = [
            ephemeral_signer(10_000_000_000_000_000_000).unwrap(),
            ephemeral_signer(1_000_000_000_000_000_000).unwrap(),
        ];
        let diff = transmitter_overrides(4, &attesters);

        // nonce + threshold + 2 array entries + 2 membership entries
        assert_eq!(diff.len(), 6);
        assert_eq!(diff[&used_nonce_slot(4, SYNTHETIC_NONCE)], B256::ZERO);
        assert_eq!(
            diff[&B256::from(U256::from(4u64))],
            B256::from(U256::from(2u64))
        );
        assert_eq!(
            diff[&attester_enabled_slot(attesters[0].address())],
            B256::from(U256::from(1u64))
        );
    }

    #[test]
    fn transmitter_overrides_slot_into_account_override() {
        let attesters = [
            ephemeral_signer(10_000_000_000_000_000_000).unwrap(),
            ephemeral_signer(1_000_000_000_000_000_000).unwrap(),
        ];
        let account = AccountOverride {
            state_diff: Some(transmitter_overrides(4, &attesters)),
            ..Default::default()
        };
        assert!(account.state_diff.is_some_and(|d| d.len() == 6));
    }

    #[test]
    fn synthetic_message_matches_path() {
        let path = Path {
            from_chain: Chain::Noble,
            to_chain: Chain::Base,
            sender_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
            receiver_address: "0xD54c1628F113dA05bE5048dF948bc8dade604911".to_string(),
            amount: U256::from(25_000_000u64),
            fee: U256::ZERO,
        };
        let message = synthetic_burn_message(&path).unwrap();
        assert_eq!(message.header.source_domain, 4);
        assert_eq!(message.header.destination_domain, 6);
        assert_eq!(message.header.nonce, SYNTHETIC_NONCE);
        assert_eq!(message.body.burn_token, Chain::Noble.usdc_token32());
        assert_eq!(message.body.amount, path.amount);
    }
}
