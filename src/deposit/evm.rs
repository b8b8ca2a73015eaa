//! Sponsored burns on EVM source chains.
//!
//! The user never sends a transaction. They sign a USDC permit for the
//! multicaller contract, the burn call is wrapped in
//! `executeCallWithPermit`, and the resulting calldata is handed to the
//! relayer named in the permit deadline's low bits.

use alloy_primitives::{hex, keccak256, Address, Bytes, U256};
use alloy_provider::DynProvider;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use chrono::Utc;
use tracing::info;

use crate::chain::Chain;
use crate::clients::{with_receipt_deadline, Clients};
use crate::contracts::{IErc20, IMulticallerWithPermit, ITokenMessenger};
use crate::error::Result;
use crate::message::{Call, CallKind};
use crate::path::Path;
use crate::protocol::address::bytes32_for_chain;
use crate::protocol::receipt::DepositEvents;
use crate::spans;

use super::permit::{pack_deadline, permit_message, sign_permit, PermitDomain, PermitSignature};
use super::DepositOutcome;

/// How long a signed permit stays valid.
const PERMIT_VALIDITY_SECS: u64 = 3_600;

/// Read the EIP-712 domain fields from the USDC deployment on `chain`.
pub async fn permit_domain(provider: &DynProvider, chain: Chain) -> Result<PermitDomain> {
    let usdc = IErc20::new(chain.usdc_address()?, provider.clone());
    let name = usdc.name().call().await?;
    let version = usdc.version().call().await?;
    Ok(PermitDomain {
        name,
        version,
        chain_id: chain.chain_id()?,
        contract: chain.usdc_address()?,
    })
}

/// Current permit nonce for `owner` on the USDC contract.
pub async fn permit_nonce(provider: &DynProvider, chain: Chain, owner: Address) -> Result<U256> {
    let usdc = IErc20::new(chain.usdc_address()?, provider.clone());
    Ok(usdc.nonces(owner).call().await?)
}

/// Sign a permit granting the multicaller the full transfer amount, with the
/// source chain's relayer packed into the deadline.
pub fn sign_sponsored_permit(
    signer: &PrivateKeySigner,
    path: &Path,
    multicaller: Address,
    nonce: U256,
    domain: &PermitDomain,
) -> Result<PermitSignature> {
    let relayer = path.from_chain.destination_caller_address()?;
    let deadline_secs = Utc::now().timestamp() as u64 + PERMIT_VALIDITY_SECS;
    let permit = permit_message(
        signer.address(),
        multicaller,
        path.amount,
        nonce,
        pack_deadline(deadline_secs, relayer),
    );
    sign_permit(signer, &permit, domain)
}

/// ABI-encoded `depositForBurnWithCaller` for this path. The burned amount
/// is the transfer amount net of the fee, which the multicaller keeps.
pub fn burn_calldata(path: &Path) -> Result<Bytes> {
    let to = path.to_chain;
    let call = ITokenMessenger::depositForBurnWithCallerCall {
        amount: path.net_amount()?,
        destinationDomain: to.domain(),
        mintRecipient: bytes32_for_chain(to, &path.receiver_address)?,
        burnToken: path.from_chain.usdc_address()?,
        destinationCaller: bytes32_for_chain(to, to.destination_caller())?,
    };
    Ok(Bytes::from(call.abi_encode()))
}

/// Wrap a burn call and its permit into `executeCallWithPermit` calldata.
pub fn multicall_calldata(
    user: Address,
    amount: U256,
    message: Bytes,
    signature: &PermitSignature,
) -> Bytes {
    let call = IMulticallerWithPermit::executeCallWithPermitCall {
        call: IMulticallerWithPermit::PermitCall {
            user,
            amount,
            message,
            deadline: signature.deadline,
            v: signature.v,
            r: signature.r,
            s: signature.s,
        },
    };
    Bytes::from(call.abi_encode())
}

/// Build the sponsored deposit for an EVM source chain.
///
/// Nothing is broadcast: the returned call is what the relayer submits, and
/// the hash of its calldata is the transfer's idempotency key.
pub async fn deposit(
    clients: &Clients,
    path: &Path,
    signer: &PrivateKeySigner,
) -> Result<DepositOutcome> {
    let span = spans::deposit_for_burn(&path.from_chain, &path.to_chain, &path.amount);
    let _guard = span.enter();

    path.validate()?;
    let provider = clients.evm(path.from_chain)?;
    let multicaller = clients.multicaller(path.from_chain)?;

    let domain = permit_domain(&provider, path.from_chain).await?;
    let nonce = permit_nonce(&provider, path.from_chain, signer.address()).await?;
    let signature = sign_sponsored_permit(signer, path, multicaller, nonce, &domain)?;

    let burn = burn_calldata(path)?;
    let calldata = multicall_calldata(signer.address(), path.amount, burn, &signature);
    let hash = keccak256(&calldata);

    info!(hash = %hash, chain = %path.from_chain, "sponsored deposit built");
    Ok(DepositOutcome {
        hash: hash.to_string(),
        calls: vec![Call {
            order: 0,
            kind: CallKind::Contract,
            data: hex::encode_prefixed(&calldata),
            chain: path.from_chain,
        }],
        events: None,
    })
}

/// Make sure `owner` has approved the token messenger for at least the
/// transfer amount, submitting an unbounded approval only when needed.
pub async fn ensure_allowance(
    provider: &DynProvider,
    chain: Chain,
    owner: Address,
    amount: U256,
) -> Result<()> {
    let usdc = IErc20::new(chain.usdc_address()?, provider.clone());
    let messenger = chain.token_messenger();

    let current = usdc.allowance(owner, messenger).call().await?;
    if current >= amount {
        return Ok(());
    }

    let pending = usdc.approve(messenger, U256::MAX).send().await?;
    let receipt = with_receipt_deadline(pending.get_receipt()).await?;
    if !receipt.status() {
        return Err(crate::error::PathwayError::TransactionFailed {
            reason: format!("approval reverted: {}", receipt.transaction_hash),
        });
    }
    info!(tx_hash = %receipt.transaction_hash, "token messenger approval set");
    Ok(())
}

/// Submit `depositForBurnWithCaller` directly from the relayer account.
///
/// Used when the relayer holds the funds itself; the sponsored permit path
/// is for user-held balances.
pub async fn deposit_direct(clients: &Clients, path: &Path) -> Result<DepositOutcome> {
    let span = spans::deposit_for_burn(&path.from_chain, &path.to_chain, &path.amount);
    let _guard = span.enter();

    path.validate()?;
    let provider = clients.evm_signer(path.from_chain)?;
    ensure_allowance(&provider, path.from_chain, clients.relayer_address(), path.amount).await?;

    let messenger = ITokenMessenger::new(path.from_chain.token_messenger(), provider);
    let to = path.to_chain;
    let pending = messenger
        .depositForBurnWithCaller(
            path.net_amount()?,
            to.domain(),
            bytes32_for_chain(to, &path.receiver_address)?,
            path.from_chain.usdc_address()?,
            bytes32_for_chain(to, to.destination_caller())?,
        )
        .send()
        .await?;
    let wait_span = spans::wait_for_confirmation(*pending.tx_hash(), &path.from_chain);
    let wait_guard = wait_span.enter();
    let receipt = with_receipt_deadline(pending.get_receipt()).await?;
    drop(wait_guard);
    if !receipt.status() {
        return Err(crate::error::PathwayError::TransactionFailed {
            reason: format!("deposit reverted: {}", receipt.transaction_hash),
        });
    }

    info!(tx_hash = %receipt.transaction_hash, chain = %path.from_chain, "burn confirmed");
    let events = DepositEvents::from_evm_receipt(&receipt)?;
    Ok(DepositOutcome {
        hash: receipt.transaction_hash.to_string(),
        calls: Vec::new(),
        events: Some(events),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256};

    fn base_to_noble() -> Path {
        Path {
            from_chain: Chain::Base,
            to_chain: Chain::Noble,
            sender_address: "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504".to_string(),
            receiver_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
            amount: U256::from(25_000_000u64),
            fee: U256::from(660_000u64),
        }
    }

    #[test]
    fn burn_calldata_encodes_net_amount() {
        let path = base_to_noble();
        let calldata = burn_calldata(&path).unwrap();

        let decoded =
            ITokenMessenger::depositForBurnWithCallerCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.amount, U256::from(24_340_000u64));
        assert_eq!(decoded.destinationDomain, 4);
        assert_eq!(decoded.burnToken, Chain::Base.usdc_address().unwrap());
        assert_eq!(
            decoded.destinationCaller,
            bytes32_for_chain(Chain::Noble, Chain::Noble.destination_caller()).unwrap()
        );
    }

    #[test]
    fn multicall_wraps_permit_fields() {
        let user = address!("eB4EaE8072bF3e2608f05B6812CD95133BF71504");
        let signature = PermitSignature {
            v: 27,
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            deadline: pack_deadline(1_700_000_000, user),
        };
        let calldata = multicall_calldata(
            user,
            U256::from(25_000_000u64),
            Bytes::from(vec![0xab; 4]),
            &signature,
        );

        let decoded =
            IMulticallerWithPermit::executeCallWithPermitCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.call.user, user);
        assert_eq!(decoded.call.amount, U256::from(25_000_000u64));
        assert_eq!(decoded.call.deadline, signature.deadline);
        assert_eq!(decoded.call.v, 27);
    }

    #[test]
    fn permit_packs_source_chain_relayer() {
        let signer = PrivateKeySigner::from_bytes(&B256::from(U256::from(7u8))).unwrap();
        let domain = PermitDomain {
            name: "USD Coin".to_string(),
            version: "2".to_string(),
            chain_id: 8453,
            contract: Chain::Base.usdc_address().unwrap(),
        };
        let signature = sign_sponsored_permit(
            &signer,
            &base_to_noble(),
            address!("D54c1628F113dA05bE5048dF948bc8dade604911"),
            U256::ZERO,
            &domain,
        )
        .unwrap();

        let low: U256 = signature.deadline & ((U256::from(1u8) << 160) - U256::from(1u8));
        let packed = Address::from_slice(&low.to_be_bytes::<32>()[12..]);
        assert_eq!(
            packed,
            Chain::Base.destination_caller_address().unwrap()
        );
        assert!(signature.deadline >> 160 > U256::from(Utc::now().timestamp() as u64));
    }
}
