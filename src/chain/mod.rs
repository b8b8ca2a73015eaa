//! Supported chains and their CCTP deployment parameters.
//!
//! Every branch on chain identity in this crate goes through [`Chain`]; there
//! is no string-keyed lookup table. Domain identifiers and confirmation
//! windows follow Circle's published values:
//! <https://developers.circle.com/stablecoins/required-block-confirmations>

mod addresses;

pub use addresses::*;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};

use crate::error::{PathwayError, Result};

/// A chain reachable by the transfer engine.
///
/// The first seven variants are mainnets; the rest are their test networks.
/// Note that CCTP domain identifiers are scoped per network class, so
/// `Sepolia` shares domain 0 with `Ethereum` and [`Chain::from_domain`] needs
/// to know which class it is resolving within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Avalanche,
    Optimism,
    Arbitrum,
    Noble,
    Base,
    Polygon,
    /// Ethereum Sepolia testnet
    Sepolia,
    /// Avalanche Fuji testnet
    Fuji,
    /// Noble Grand testnet
    Grand,
}

impl Chain {
    /// All chains the engine knows about.
    pub const ALL: [Chain; 10] = [
        Chain::Ethereum,
        Chain::Avalanche,
        Chain::Optimism,
        Chain::Arbitrum,
        Chain::Noble,
        Chain::Base,
        Chain::Polygon,
        Chain::Sepolia,
        Chain::Fuji,
        Chain::Grand,
    ];

    /// CCTP domain identifier.
    pub const fn domain(&self) -> u32 {
        match self {
            Chain::Ethereum | Chain::Sepolia => 0,
            Chain::Avalanche | Chain::Fuji => 1,
            Chain::Optimism => 2,
            Chain::Arbitrum => 3,
            Chain::Noble | Chain::Grand => 4,
            Chain::Base => 6,
            Chain::Polygon => 7,
        }
    }

    /// Resolve a CCTP domain identifier within `self`'s network class.
    ///
    /// Burn messages carry only the domain, so the counterpart chain of a
    /// message observed on `self` is recovered relative to `self`.
    pub fn from_domain(&self, domain: u32) -> Result<Chain> {
        let candidates: &[Chain] = if self.is_testnet() {
            &[Chain::Sepolia, Chain::Fuji, Chain::Grand]
        } else {
            &[
                Chain::Ethereum,
                Chain::Avalanche,
                Chain::Optimism,
                Chain::Arbitrum,
                Chain::Noble,
                Chain::Base,
                Chain::Polygon,
            ]
        };
        candidates
            .iter()
            .copied()
            .find(|c| c.domain() == domain)
            .ok_or_else(|| PathwayError::ChainNotSupported {
                chain: format!("domain {domain}"),
            })
    }

    pub const fn is_testnet(&self) -> bool {
        matches!(self, Chain::Sepolia | Chain::Fuji | Chain::Grand)
    }

    /// Whether this is the Cosmos leg of a path.
    pub const fn is_noble(&self) -> bool {
        matches!(self, Chain::Noble | Chain::Grand)
    }

    pub const fn is_evm(&self) -> bool {
        !self.is_noble()
    }

    /// Upper bound on the source-chain finality delay before Circle signs an
    /// attestation for a burn observed on this chain.
    pub const fn confirmation_delay(&self) -> Duration {
        match self {
            Chain::Ethereum | Chain::Optimism | Chain::Arbitrum | Chain::Base => {
                Duration::from_secs(13 * 60)
            }
            Chain::Polygon => Duration::from_secs(8 * 60),
            Chain::Sepolia => Duration::from_secs(60),
            Chain::Avalanche | Chain::Noble | Chain::Fuji | Chain::Grand => Duration::from_secs(6),
        }
    }

    /// The `NamedChain` behind an EVM variant, used for chain ids in EIP-712
    /// domains. Errors for the Cosmos chains.
    pub fn named(&self) -> Result<NamedChain> {
        match self {
            Chain::Ethereum => Ok(NamedChain::Mainnet),
            Chain::Avalanche => Ok(NamedChain::Avalanche),
            Chain::Optimism => Ok(NamedChain::Optimism),
            Chain::Arbitrum => Ok(NamedChain::Arbitrum),
            Chain::Base => Ok(NamedChain::Base),
            Chain::Polygon => Ok(NamedChain::Polygon),
            Chain::Sepolia => Ok(NamedChain::Sepolia),
            Chain::Fuji => Ok(NamedChain::AvalancheFuji),
            Chain::Noble | Chain::Grand => Err(self.not_evm()),
        }
    }

    pub fn chain_id(&self) -> Result<u64> {
        Ok(self.named()? as u64)
    }

    /// USDC token contract on an EVM chain.
    pub fn usdc_address(&self) -> Result<Address> {
        match self {
            Chain::Ethereum => Ok(ETHEREUM_USDC),
            Chain::Avalanche => Ok(AVALANCHE_USDC),
            Chain::Optimism => Ok(OPTIMISM_USDC),
            Chain::Arbitrum => Ok(ARBITRUM_USDC),
            Chain::Base => Ok(BASE_USDC),
            Chain::Polygon => Ok(POLYGON_USDC),
            Chain::Sepolia => Ok(SEPOLIA_USDC),
            Chain::Fuji => Ok(FUJI_USDC),
            Chain::Noble | Chain::Grand => Err(self.not_evm()),
        }
    }

    /// USDC as the 32-byte token identifier burn messages carry.
    pub fn usdc_token32(&self) -> FixedBytes<32> {
        match self {
            Chain::Noble | Chain::Grand => FixedBytes::from(NOBLE_USDC_TOKEN_32),
            _ => {
                // Checked arms above cover every non-EVM variant.
                let mut out = [0u8; 32];
                if let Ok(addr) = self.usdc_address() {
                    out[12..].copy_from_slice(addr.as_slice());
                }
                FixedBytes::from(out)
            }
        }
    }

    /// Bank denomination of USDC on the Cosmos chains.
    pub const fn usdc_denom(&self) -> &'static str {
        "uusdc"
    }

    pub fn token_messenger(&self) -> Address {
        match self {
            Chain::Ethereum => ETHEREUM_TOKEN_MESSENGER,
            Chain::Avalanche => AVALANCHE_TOKEN_MESSENGER,
            Chain::Optimism => OPTIMISM_TOKEN_MESSENGER,
            Chain::Arbitrum => ARBITRUM_TOKEN_MESSENGER,
            Chain::Base => BASE_TOKEN_MESSENGER,
            Chain::Polygon => POLYGON_TOKEN_MESSENGER,
            Chain::Sepolia => SEPOLIA_TOKEN_MESSENGER,
            Chain::Fuji => FUJI_TOKEN_MESSENGER,
            Chain::Noble | Chain::Grand => NOBLE_TOKEN_MESSENGER,
        }
    }

    /// `MessageTransmitter` contract. Errors for the Cosmos chains, where the
    /// transmitter is a module rather than a contract.
    pub fn message_transmitter(&self) -> Result<Address> {
        match self {
            Chain::Ethereum => Ok(ETHEREUM_MESSAGE_TRANSMITTER),
            Chain::Avalanche => Ok(AVALANCHE_MESSAGE_TRANSMITTER),
            Chain::Optimism => Ok(OPTIMISM_MESSAGE_TRANSMITTER),
            Chain::Arbitrum => Ok(ARBITRUM_MESSAGE_TRANSMITTER),
            Chain::Base => Ok(BASE_MESSAGE_TRANSMITTER),
            Chain::Polygon => Ok(POLYGON_MESSAGE_TRANSMITTER),
            Chain::Sepolia => Ok(SEPOLIA_MESSAGE_TRANSMITTER),
            Chain::Fuji => Ok(FUJI_MESSAGE_TRANSMITTER),
            Chain::Noble | Chain::Grand => Err(self.not_evm()),
        }
    }

    /// Chainlink native/USD aggregator for pricing receive gas.
    ///
    /// Returns the feed together with the chain it lives on: the POL/USD feed
    /// this crate uses is served from Arbitrum.
    pub fn native_usd_feed(&self) -> Result<(Chain, Address)> {
        match self {
            Chain::Ethereum => Ok((Chain::Ethereum, ETHEREUM_NATIVE_USD_FEED)),
            Chain::Avalanche => Ok((Chain::Avalanche, AVALANCHE_NATIVE_USD_FEED)),
            Chain::Optimism => Ok((Chain::Optimism, OPTIMISM_NATIVE_USD_FEED)),
            Chain::Arbitrum => Ok((Chain::Arbitrum, ARBITRUM_NATIVE_USD_FEED)),
            Chain::Base => Ok((Chain::Base, BASE_NATIVE_USD_FEED)),
            Chain::Polygon => Ok((Chain::Arbitrum, POLYGON_NATIVE_USD_FEED)),
            Chain::Sepolia => Ok((Chain::Sepolia, SEPOLIA_NATIVE_USD_FEED)),
            Chain::Fuji => Ok((Chain::Fuji, FUJI_NATIVE_USD_FEED)),
            Chain::Noble | Chain::Grand => Err(self.not_evm()),
        }
    }

    /// The relayer account allowed to call `receiveMessage` for transfers
    /// destined to this chain, in its native textual form.
    pub fn destination_caller(&self) -> &'static str {
        match self {
            Chain::Avalanche => "0xD54c1628F113dA05bE5048dF948bc8dade604911",
            Chain::Noble | Chain::Grand => NOBLE_DESTINATION_CALLER,
            _ => "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504",
        }
    }

    /// The relayer account as an EVM address. Errors for the Cosmos chains.
    pub fn destination_caller_address(&self) -> Result<Address> {
        match self {
            Chain::Avalanche => Ok(AVALANCHE_DESTINATION_CALLER),
            Chain::Noble | Chain::Grand => Err(self.not_evm()),
            _ => Ok(EVM_DESTINATION_CALLER),
        }
    }

    /// Bech32 human-readable part for the Cosmos chains.
    pub const fn bech32_prefix(&self) -> &'static str {
        "noble"
    }

    fn not_evm(&self) -> PathwayError {
        PathwayError::ChainNotSupported {
            chain: format!("{self} is not an EVM chain"),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Ethereum => "ethereum",
            Chain::Avalanche => "avalanche",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
            Chain::Noble => "noble",
            Chain::Base => "base",
            Chain::Polygon => "polygon",
            Chain::Sepolia => "sepolia",
            Chain::Fuji => "fuji",
            Chain::Grand => "grand",
        };
        f.write_str(name)
    }
}

impl FromStr for Chain {
    type Err = PathwayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" => Ok(Chain::Ethereum),
            "avalanche" => Ok(Chain::Avalanche),
            "optimism" => Ok(Chain::Optimism),
            "arbitrum" => Ok(Chain::Arbitrum),
            "noble" => Ok(Chain::Noble),
            "base" => Ok(Chain::Base),
            "polygon" => Ok(Chain::Polygon),
            "sepolia" => Ok(Chain::Sepolia),
            "fuji" => Ok(Chain::Fuji),
            "grand" => Ok(Chain::Grand),
            other => Err(PathwayError::ChainNotSupported {
                chain: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Chain::Ethereum, 0)]
    #[case(Chain::Avalanche, 1)]
    #[case(Chain::Optimism, 2)]
    #[case(Chain::Arbitrum, 3)]
    #[case(Chain::Noble, 4)]
    #[case(Chain::Base, 6)]
    #[case(Chain::Polygon, 7)]
    #[case(Chain::Sepolia, 0)]
    #[case(Chain::Fuji, 1)]
    #[case(Chain::Grand, 4)]
    fn domains_match_circle_registry(#[case] chain: Chain, #[case] domain: u32) {
        assert_eq!(chain.domain(), domain);
    }

    #[test]
    fn domain_resolution_is_scoped_to_network_class() {
        let mainnet = Chain::Noble.from_domain(0).unwrap();
        assert_eq!(mainnet, Chain::Ethereum);

        let testnet = Chain::Grand.from_domain(0).unwrap();
        assert_eq!(testnet, Chain::Sepolia);

        assert!(Chain::Ethereum.from_domain(99).is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for chain in Chain::ALL {
            let parsed: Chain = chain.to_string().parse().unwrap();
            assert_eq!(parsed, chain);
        }
    }

    #[test]
    fn cosmos_chains_have_no_evm_contracts() {
        assert!(Chain::Noble.usdc_address().is_err());
        assert!(Chain::Noble.message_transmitter().is_err());
        assert!(Chain::Grand.native_usd_feed().is_err());
        assert!(Chain::Noble.chain_id().is_err());
    }

    #[test]
    fn evm_usdc_token32_is_left_padded_address() {
        let token = Chain::Ethereum.usdc_token32();
        assert_eq!(&token[..12], &[0u8; 12]);
        assert_eq!(&token[12..], Chain::Ethereum.usdc_address().unwrap().as_slice());
    }

    #[test]
    fn confirmation_delays_follow_published_windows() {
        assert_eq!(Chain::Ethereum.confirmation_delay(), Duration::from_secs(780));
        assert_eq!(Chain::Polygon.confirmation_delay(), Duration::from_secs(480));
        assert_eq!(Chain::Avalanche.confirmation_delay(), Duration::from_secs(6));
        assert_eq!(Chain::Sepolia.confirmation_delay(), Duration::from_secs(60));
    }
}
