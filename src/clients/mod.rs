//! Chain client wiring.
//!
//! All providers and signers are constructed once from [`Config`] and passed
//! down to the engine and relay stages; nothing in the crate reaches for a
//! global client.

pub mod noble;

pub use noble::{AccountInfo, MsgDepositForBurnWithCaller, MsgReceiveMessage, NobleClient};

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;

use crate::chain::Chain;
use crate::config::Config;
use crate::error::{PathwayError, Result};
use crate::protocol::AttestationClient;

/// Longest any EVM receipt wait may take before the submission is treated
/// as failed. The Noble side has its own deadline on `tx_events`.
pub(crate) const EVM_RECEIPT_TIMEOUT: Duration = Duration::from_secs(90);

/// Bound a receipt wait so a stalled RPC cannot hang a pipeline stage.
pub(crate) async fn with_receipt_deadline<F, T, E>(wait: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(EVM_RECEIPT_TIMEOUT, wait).await {
        Ok(result) => result.map_err(|e| PathwayError::TransactionFailed {
            reason: format!("receipt unavailable: {e}"),
        }),
        Err(_) => Err(PathwayError::TransactionFailed {
            reason: format!("no receipt within {}s", EVM_RECEIPT_TIMEOUT.as_secs()),
        }),
    }
}

/// Every client the engine and relay pipeline need, built from config.
pub struct Clients {
    evm_urls: HashMap<Chain, String>,
    evm: HashMap<Chain, DynProvider>,
    pub noble: NobleClient,
    pub attestation: AttestationClient,
    relayer: PrivateKeySigner,
    multicaller: HashMap<Chain, Address>,
}

impl Clients {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut evm = HashMap::new();
        for (chain, url) in &config.rpc.evm_urls {
            let parsed: url::Url = url.parse().map_err(|_| PathwayError::InvalidUrl {
                reason: format!("RPC URL for {chain} is not a URL: {url}"),
            })?;
            evm.insert(*chain, ProviderBuilder::new().connect_http(parsed).erased());
        }

        let noble = NobleClient::with_signer(
            &config.rpc.noble_rpc_url,
            &config.rpc.noble_chain_id,
            &config.signing.noble_mnemonic,
        )?;

        let relayer: PrivateKeySigner = config
            .signing
            .relayer_private_key
            .parse()
            .map_err(|_| PathwayError::InvalidConfig("RELAYER_PRIVATE_KEY is not a valid key".to_string()))?;

        Ok(Self {
            evm_urls: config.rpc.evm_urls.clone(),
            evm,
            noble,
            attestation: AttestationClient::new(config.attestation_base_url()),
            relayer,
            multicaller: config.rpc.multicaller.clone(),
        })
    }

    /// Read-only provider for an EVM chain.
    pub fn evm(&self, chain: Chain) -> Result<DynProvider> {
        self.evm
            .get(&chain)
            .cloned()
            .ok_or_else(|| PathwayError::ChainNotSupported {
                chain: format!("no RPC endpoint configured for {chain}"),
            })
    }

    /// Provider for an EVM chain with the relayer wallet attached, for
    /// submitting mints and sponsored burns.
    pub fn evm_signer(&self, chain: Chain) -> Result<DynProvider> {
        let url = self
            .evm_urls
            .get(&chain)
            .ok_or_else(|| PathwayError::ChainNotSupported {
                chain: format!("no RPC endpoint configured for {chain}"),
            })?;
        let parsed: url::Url = url.parse().map_err(|_| PathwayError::InvalidUrl {
            reason: format!("RPC URL for {chain} is not a URL: {url}"),
        })?;
        Ok(ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.relayer.clone()))
            .connect_http(parsed)
            .erased())
    }

    /// The EVM relayer account.
    pub fn relayer_address(&self) -> Address {
        self.relayer.address()
    }

    /// The permit-gated multicaller deployment on a chain, if configured.
    pub fn multicaller(&self, chain: Chain) -> Result<Address> {
        self.multicaller
            .get(&chain)
            .copied()
            .ok_or_else(|| PathwayError::InvalidConfig(format!(
                "no multicaller deployment configured for {chain}"
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn receipt_wait_is_deadline_bounded() {
        let hung = std::future::pending::<std::result::Result<(), std::io::Error>>();
        let result = with_receipt_deadline(hung).await;
        match result {
            Err(PathwayError::TransactionFailed { reason }) => {
                assert!(reason.contains("no receipt within"));
            }
            other => panic!("expected a timeout failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn receipt_wait_passes_results_through() {
        let ok = with_receipt_deadline(std::future::ready(
            Ok::<u64, std::io::Error>(7),
        ))
        .await
        .unwrap();
        assert_eq!(ok, 7);

        let err = with_receipt_deadline(std::future::ready(Err::<u64, _>(
            std::io::Error::new(std::io::ErrorKind::Other, "connection reset"),
        )))
        .await;
        assert!(matches!(err, Err(PathwayError::TransactionFailed { .. })));
    }
}
