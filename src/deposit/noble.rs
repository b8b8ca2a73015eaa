//! Burns originating on Noble.
//!
//! Unlike the EVM side there is no sponsorship: the configured Noble account
//! signs and broadcasts directly. The transfer fee is forwarded to the
//! relayer's Noble account as a bank send in the same transaction as the
//! burn, so either both land or neither does.

use cosmrs::{tx::Fee, tx::Msg, AccountId, Coin};
use tracing::info;

use crate::clients::{Clients, MsgDepositForBurnWithCaller};
use crate::error::{PathwayError, Result};
use crate::path::Path;
use crate::protocol::address::bytes32_for_chain;
use crate::spans;

use super::DepositOutcome;

/// Flat uusdc fee attached to a Noble burn transaction.
const BURN_TX_FEE: u128 = 20_000;
/// Headroom over the simulated gas.
const GAS_MULTIPLIER: f64 = 1.5;

const MEMO: &str = "pathway";

/// The CCTP burn message for this path.
pub fn deposit_msg(path: &Path) -> Result<MsgDepositForBurnWithCaller> {
    let to = path.to_chain;
    Ok(MsgDepositForBurnWithCaller {
        from: path.sender_address.clone(),
        amount: path.net_amount()?.to_string(),
        destination_domain: to.domain(),
        mint_recipient: bytes32_for_chain(to, &path.receiver_address)?.to_vec(),
        burn_token: path.from_chain.usdc_denom().to_string(),
        destination_caller: bytes32_for_chain(to, to.destination_caller())?.to_vec(),
    })
}

/// Bank send moving the transfer fee from the sender to the relayer's Noble
/// account.
pub fn fee_transfer_msg(path: &Path, denom: cosmrs::Denom) -> Result<cosmrs::bank::MsgSend> {
    let from: AccountId = path
        .sender_address
        .parse()
        .map_err(|_| PathwayError::InvalidAddress {
            reason: format!("{} is not a Noble account", path.sender_address),
        })?;
    let relayer: AccountId = path
        .from_chain
        .destination_caller()
        .parse()
        .map_err(|_| PathwayError::InvalidAddress {
            reason: "relayer Noble account is malformed".to_string(),
        })?;
    let fee = u128::try_from(path.fee).map_err(|_| PathwayError::InvalidPath {
        reason: format!("fee {} overflows a Coin amount", path.fee),
    })?;
    Ok(cosmrs::bank::MsgSend {
        from_address: from,
        to_address: relayer,
        amount: vec![Coin {
            denom,
            amount: fee,
        }],
    })
}

/// Sign and broadcast a burn from Noble.
///
/// The configured Noble signer must be the path's sender; its sequence and
/// account number are queried fresh for every submission.
pub async fn deposit(clients: &Clients, path: &Path) -> Result<DepositOutcome> {
    let span = spans::deposit_for_burn(&path.from_chain, &path.to_chain, &path.amount);
    let _guard = span.enter();

    path.validate()?;

    let signer = clients.noble.address()?.clone();
    if signer.to_string() != path.sender_address {
        return Err(PathwayError::InvalidAddress {
            reason: format!(
                "Noble signer {signer} does not match sender {}",
                path.sender_address
            ),
        });
    }

    let denom = clients.noble.usdc_denom();
    let fee_transfer = fee_transfer_msg(path, denom.clone())?
        .to_any()
        .map_err(|e| PathwayError::Cosmos(format!("failed to encode bank send: {e}")))?;
    let burn = deposit_msg(path)?.to_any();
    let msgs = vec![fee_transfer, burn];

    let simulated = clients.noble.simulate(&signer, msgs.clone()).await?;
    let gas = (simulated as f64 * GAS_MULTIPLIER).ceil() as u64;
    let fee = Fee::from_amount_and_gas(
        Coin {
            denom,
            amount: BURN_TX_FEE,
        },
        gas,
    );

    let hash = clients.noble.sign_and_broadcast(msgs, fee, MEMO).await?;
    info!(tx_hash = %hash, gas, "Noble burn broadcast");
    Ok(DepositOutcome {
        hash,
        calls: Vec::new(),
        events: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use alloy_primitives::U256;

    fn noble_to_base() -> Path {
        Path {
            from_chain: Chain::Noble,
            to_chain: Chain::Base,
            sender_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
            receiver_address: "0xD54c1628F113dA05bE5048dF948bc8dade604911".to_string(),
            amount: U256::from(25_000_000u64),
            fee: U256::from(660_000u64),
        }
    }

    #[test]
    fn deposit_msg_burns_net_amount_in_uusdc() {
        let msg = deposit_msg(&noble_to_base()).unwrap();
        assert_eq!(msg.amount, "24340000");
        assert_eq!(msg.burn_token, "uusdc");
        assert_eq!(msg.destination_domain, 6);
        // EVM recipient is left-padded to 32 bytes.
        assert_eq!(msg.mint_recipient.len(), 32);
        assert_eq!(&msg.mint_recipient[..12], &[0u8; 12]);
    }

    #[test]
    fn fee_transfer_pays_the_relayer() {
        let path = noble_to_base();
        let denom: cosmrs::Denom = "uusdc".parse().unwrap();
        let msg = fee_transfer_msg(&path, denom).unwrap();
        assert_eq!(msg.from_address.to_string(), path.sender_address);
        assert_eq!(
            msg.to_address.to_string(),
            Chain::Noble.destination_caller()
        );
        assert_eq!(msg.amount[0].amount, 660_000);
    }
}
