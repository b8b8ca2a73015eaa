//! Fee and quote computation.
//!
//! A quote prices both legs of a transfer in USDC: the source-chain deposit
//! (execution cost) and the destination-chain mint plus the protocol routing
//! fee. Gas legs are estimated speculatively against patched contract state;
//! see [`simulation`].

pub mod simulation;

use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use tracing::warn;

use crate::chain::Chain;
use crate::clients::Clients;
use crate::contracts::{AggregatorV3, IAddrResolver, IEnsRegistry, ENS_REGISTRY};
use crate::deposit;
use crate::error::{PathwayError, Result};
use crate::message::{FeeAmount, Quote, QuoteFee};
use crate::path::Path;
use crate::protocol::address::{is_ens_name, namehash};
use crate::spans;

/// Flat routing fee, 0.16 USDC.
const FLAT_RATE: u64 = 160_000;
/// Routing fee ceiling, 1.31 USDC.
const MAX_FEE: u64 = 1_310_000;
/// Amount below which the flat rate applies, 10 USDC.
const MIN_AMOUNT: u64 = 10_000_000;
/// Amount at which the fee reaches its ceiling, 21,000 USDC.
const MAX_AMOUNT: u64 = 21_000_000_000;

/// Buffer added on top of the routing fee when the mint happens on Noble,
/// 0.01 USDC. Gas there cannot be estimated with state overrides, so the
/// routing fee absorbs it and the buffer protects the relayer from loss.
const NOBLE_RECEIVE_BUFFER: u64 = 10_000;

/// Floor charged for mints on Ethereum, 5 USDC.
const ETHEREUM_RECEIVE_FLOOR: u64 = 5_000_000;
/// Above this estimate on cheap chains the gas component is dropped and
/// only the routing fee is charged, 1 USDC.
const CHEAP_CHAIN_CEILING: u64 = 1_000_000;

/// Piecewise-linear routing fee for a transfer amount, in USDC base units.
///
/// Flat below 10 USDC, then linear up to a 1.31 USDC ceiling at 21,000 USDC.
pub fn routing_fee(amount: U256) -> U256 {
    if amount <= U256::from(MIN_AMOUNT) {
        return U256::from(FLAT_RATE);
    }
    if amount >= U256::from(MAX_AMOUNT) {
        return U256::from(MAX_FEE);
    }
    let slope = (MAX_FEE - FLAT_RATE) as f64 / (MAX_AMOUNT - MIN_AMOUNT) as f64;
    // amount < MAX_AMOUNT here, so the conversion is exact enough.
    let over_min = (amount - U256::from(MIN_AMOUNT)).to::<u64>();
    let fee = FLAT_RATE + (slope * over_min as f64).floor() as u64;
    U256::from(fee.min(MAX_FEE))
}

/// Quotes and receiver resolution over a set of chain clients.
pub struct FeeEstimator<'a> {
    clients: &'a Clients,
}

impl<'a> FeeEstimator<'a> {
    pub fn new(clients: &'a Clients) -> Self {
        Self { clients }
    }

    /// Convert a wei-denominated gas cost into USDC base units using the
    /// chain's Chainlink native/USD feed.
    pub async fn usd_quote_for_wei(&self, wei: U256, chain: Chain) -> Result<U256> {
        let (feed_chain, feed_address) = chain.native_usd_feed()?;
        let provider = self.clients.evm(feed_chain)?;
        let round = AggregatorV3::new(feed_address, provider)
            .latestRoundData()
            .call()
            .await?;

        let price = u128::try_from(round.answer).map_err(|_| PathwayError::GasEstimation {
            reason: format!("price feed for {chain} returned a negative answer"),
        })?;
        let wei = u128::try_from(wei).map_err(|_| PathwayError::GasEstimation {
            reason: "gas cost overflows u128".to_string(),
        })?;

        let native_value = wei as f64 / 1e18;
        let usd_value = native_value * price as f64 / 1e8;
        Ok(U256::from((usd_value * 1e6).round() as u128))
    }

    /// Resolve an ENS receiver to its address; passthrough for anything that
    /// is not an ENS name.
    pub async fn resolve_receiver(&self, receiver: &str, testnet: bool) -> Result<String> {
        if !is_ens_name(receiver) {
            return Ok(receiver.to_string());
        }

        let ens_chain = if testnet { Chain::Sepolia } else { Chain::Ethereum };
        let provider = self.clients.evm(ens_chain)?;
        let node = namehash(receiver);

        let resolver = IEnsRegistry::new(ENS_REGISTRY, provider.clone())
            .resolver(node)
            .call()
            .await?;
        if resolver == Address::ZERO {
            return Err(PathwayError::ReceiverResolution {
                reason: format!("no resolver set for {receiver}"),
            });
        }

        let resolved = IAddrResolver::new(resolver, provider).addr(node).call().await?;
        if resolved == Address::ZERO {
            return Err(PathwayError::ReceiverResolution {
                reason: format!("{receiver} does not resolve to an address"),
            });
        }
        Ok(resolved.to_string())
    }

    /// Total charge for the destination-side mint, in USDC.
    pub async fn estimate_receive(&self, path: &Path) -> Result<FeeAmount> {
        let fee = routing_fee(path.amount);

        if path.to_chain.is_noble() {
            return Ok(FeeAmount::usdc(fee + U256::from(NOBLE_RECEIVE_BUFFER)));
        }

        let provider = self.clients.evm(path.to_chain)?;
        let gas = simulation::receive_gas(&provider, path).await?;
        let gas_price = provider.get_gas_price().await?;
        let gas_in_usdc = self
            .usd_quote_for_wei(U256::from(gas as u128 * gas_price), path.to_chain)
            .await?
            + fee;

        let amount = if path.to_chain == Chain::Ethereum {
            gas_in_usdc.max(U256::from(ETHEREUM_RECEIVE_FLOOR))
        } else if gas_in_usdc > U256::from(CHEAP_CHAIN_CEILING) {
            // An estimate this large on a cheap chain means a pathological
            // gas spike; charge the routing fee alone rather than pass it on.
            warn!(estimate = %gas_in_usdc, chain = %path.to_chain, "receive estimate above ceiling");
            fee
        } else {
            gas_in_usdc
        };
        Ok(FeeAmount::usdc(amount))
    }

    /// Gas for the source-chain deposit, in USDC.
    pub async fn estimate_deposit(&self, path: &Path) -> Result<FeeAmount> {
        if path.from_chain.is_noble() {
            let msg = deposit::noble::deposit_msg(path)?;
            let sender = path
                .sender_address
                .parse()
                .map_err(|_| PathwayError::InvalidAddress {
                    reason: format!("{} is not a Noble account", path.sender_address),
                })?;
            let gas = self.clients.noble.simulate(&sender, vec![msg.to_any()]).await?;
            return Ok(FeeAmount::usdc(U256::from(gas)));
        }

        let provider = self.clients.evm(path.from_chain)?;
        let signer = simulation::synthetic_deposit_signer()?;

        // Price against a synthetic sender with a placeholder fee; the gas
        // profile does not depend on either.
        let mut synthetic = path.clone();
        synthetic.sender_address = signer.address().to_string();
        synthetic.fee = U256::from(5_000_000u64);

        let multicaller = self.clients.multicaller(path.from_chain)?;
        let domain = deposit::evm::permit_domain(&provider, path.from_chain).await?;
        let nonce = deposit::evm::permit_nonce(&provider, path.from_chain, signer.address()).await?;
        let signature = deposit::evm::sign_sponsored_permit(
            &signer,
            &synthetic,
            multicaller,
            nonce,
            &domain,
        )?;
        let burn = deposit::evm::burn_calldata(&synthetic)?;
        let multicall_data =
            deposit::evm::multicall_calldata(signer.address(), synthetic.amount, burn, &signature);

        let gas = simulation::deposit_gas(
            &provider,
            path.from_chain,
            multicall_data,
            multicaller,
            signer.address(),
            synthetic.amount,
        )
        .await?;
        let gas_price = provider.get_gas_price().await?;
        let gas_in_usdc = self
            .usd_quote_for_wei(U256::from(gas as u128 * gas_price), path.from_chain)
            .await?;
        Ok(FeeAmount::usdc(gas_in_usdc))
    }

    /// Full quote for a path: validates, resolves the receiver, and prices
    /// both legs concurrently.
    pub async fn quote(&self, path: &Path) -> Result<Quote> {
        let span = spans::quote(&path.from_chain, &path.to_chain, &path.amount);
        let _guard = span.enter();

        path.validate()?;

        let mut resolved = path.clone();
        resolved.receiver_address = self
            .resolve_receiver(&path.receiver_address, path.to_chain.is_testnet())
            .await?;

        let (execution_cost, routing_fee) = futures::future::try_join(
            self.estimate_deposit(&resolved),
            self.estimate_receive(&resolved),
        )
        .await
        .inspect_err(|e| spans::record_error(e))?;

        Ok(Quote {
            estimated_time_in_milliseconds: path.from_chain.confirmation_delay().as_millis() as u64,
            estimated_output_amount: path.amount,
            estimated_fee: QuoteFee {
                execution_cost,
                routing_fee,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5_000_000, FLAT_RATE)] // 5 USDC: below the knee, flat
    #[case(10_000_000, FLAT_RATE)] // exactly at the knee
    #[case(21_000_000_000, MAX_FEE)] // at the ceiling
    #[case(50_000_000_000, MAX_FEE)] // far beyond the ceiling
    fn routing_fee_boundary_cases(#[case] amount: u64, #[case] expected: u64) {
        assert_eq!(routing_fee(U256::from(amount)), U256::from(expected));
    }

    #[test]
    fn routing_fee_20000_usdc_is_near_ceiling() {
        // 20,000 USDC sits just under the 21,000 knee.
        let fee = routing_fee(U256::from(20_000_000_000u64));
        assert!(fee > U256::from(1_200_000u64));
        assert!(fee < U256::from(MAX_FEE));
    }

    #[test]
    fn routing_fee_is_monotonic() {
        let mut last = U256::ZERO;
        for amount in (0..30_000_000_000u64).step_by(500_000_000) {
            let fee = routing_fee(U256::from(amount));
            assert!(fee >= last, "fee decreased at amount {amount}");
            last = fee;
        }
    }

    #[test]
    fn routing_fee_matches_slope_midpoint() {
        // Halfway between the knees the fee is halfway between the rates,
        // modulo flooring.
        let mid = U256::from((MIN_AMOUNT + MAX_AMOUNT) / 2);
        let fee = routing_fee(mid);
        let expected = U256::from((FLAT_RATE + MAX_FEE) / 2);
        let delta = if fee > expected { fee - expected } else { expected - fee };
        assert!(delta <= U256::from(1u8));
    }

    #[test]
    fn huge_amounts_do_not_panic() {
        assert_eq!(routing_fee(U256::MAX), U256::from(MAX_FEE));
    }
}
