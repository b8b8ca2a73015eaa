//! Transfer paths and their validation rules.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::{PathwayError, Result};
use crate::message::u256_decimal;
use crate::protocol::address::is_ens_name;

/// A requested transfer: source, destination, the two accounts, and amounts
/// in USDC base units.
///
/// `receiver_address` may be an ENS name when the destination is an EVM
/// chain; it is resolved to an address during quoting. `fee` is the total
/// charge deducted from `amount` before the burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub from_chain: Chain,
    pub to_chain: Chain,
    pub sender_address: String,
    pub receiver_address: String,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    #[serde(with = "u256_decimal", default)]
    pub fee: U256,
}

impl Path {
    /// Check the structural rules every path must satisfy.
    ///
    /// Rejects zero amounts, loops, Noble-formatted receivers headed to an
    /// EVM chain, ENS receivers headed anywhere but an EVM chain, and routes
    /// that mix mainnets with testnets.
    pub fn validate(&self) -> Result<()> {
        if self.receiver_address.starts_with("noble1") && !self.to_chain.is_noble() {
            return Err(PathwayError::InvalidPath {
                reason: "receiver is a Noble address but the destination is not Noble".to_string(),
            });
        }

        if is_ens_name(&self.receiver_address) && !self.to_chain.is_evm() {
            return Err(PathwayError::InvalidPath {
                reason: "receiver is an ENS name but the destination is not an EVM chain"
                    .to_string(),
            });
        }

        if self.amount == U256::ZERO {
            return Err(PathwayError::InvalidPath {
                reason: "amount must be greater than 0".to_string(),
            });
        }

        if self.from_chain == self.to_chain {
            return Err(PathwayError::InvalidPath {
                reason: "source and destination chains cannot be the same".to_string(),
            });
        }

        if self.from_chain.is_testnet() != self.to_chain.is_testnet() {
            return Err(PathwayError::InvalidPath {
                reason: "source and destination must be in the same network class".to_string(),
            });
        }

        Ok(())
    }

    /// The amount actually burned once the fee is deducted.
    pub fn net_amount(&self) -> Result<U256> {
        self.amount
            .checked_sub(self.fee)
            .ok_or_else(|| PathwayError::InvalidPath {
                reason: format!("fee {} exceeds amount {}", self.fee, self.amount),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn path(from: Chain, to: Chain, receiver: &str, amount: u64) -> Path {
        Path {
            from_chain: from,
            to_chain: to,
            sender_address: "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504".to_string(),
            receiver_address: receiver.to_string(),
            amount: U256::from(amount),
            fee: U256::ZERO,
        }
    }

    #[test]
    fn valid_paths_pass() {
        let noble = "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek";
        let evm = "0xD54c1628F113dA05bE5048dF948bc8dade604911";
        assert!(path(Chain::Base, Chain::Noble, noble, 25_000_000).validate().is_ok());
        assert!(path(Chain::Noble, Chain::Arbitrum, evm, 25_000_000).validate().is_ok());
        assert!(path(Chain::Ethereum, Chain::Avalanche, evm, 1).validate().is_ok());
        assert!(path(Chain::Sepolia, Chain::Grand, noble, 10).validate().is_ok());
        assert!(path(Chain::Noble, Chain::Ethereum, "vitalik.eth", 10).validate().is_ok());
    }

    #[rstest]
    #[case(path(Chain::Base, Chain::Arbitrum, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek", 10))]
    #[case(path(Chain::Base, Chain::Noble, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek", 0))]
    #[case(path(Chain::Base, Chain::Base, "0xD54c1628F113dA05bE5048dF948bc8dade604911", 10))]
    #[case(path(Chain::Base, Chain::Grand, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek", 10))]
    #[case(path(Chain::Sepolia, Chain::Noble, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek", 10))]
    #[case(path(Chain::Base, Chain::Noble, "vitalik.eth", 10))]
    fn invalid_paths_are_rejected(#[case] path: Path) {
        assert!(matches!(
            path.validate(),
            Err(PathwayError::InvalidPath { .. })
        ));
    }

    #[test]
    fn net_amount_subtracts_fee() {
        let mut p = path(Chain::Base, Chain::Noble, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek", 25_000_000);
        p.fee = U256::from(660_000u64);
        assert_eq!(p.net_amount().unwrap(), U256::from(24_340_000u64));

        p.fee = U256::from(30_000_000u64);
        assert!(p.net_amount().is_err());
    }
}
