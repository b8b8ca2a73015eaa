//! Environment-driven configuration.
//!
//! Everything the engine and the relay pipeline need is injected here: RPC
//! endpoints per chain, signing material for the relayer accounts, the
//! attestation service base URL, and pipeline tuning knobs. Loaded from the
//! process environment, with an optional `.env` file for development.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path as FsPath;

use alloy_primitives::Address;

use crate::chain::Chain;
use crate::error::{PathwayError, Result};

/// Which network class the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mainnet,
    Testnet,
}

impl Platform {
    pub fn is_testnet(&self) -> bool {
        matches!(self, Platform::Testnet)
    }
}

/// Main configuration for the engine and relay pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub platform: Platform,
    pub rpc: RpcConfig,
    pub signing: SigningConfig,
    pub relay: RelayConfig,
    pub api_listen_addr: SocketAddr,
}

/// RPC endpoints.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// EVM endpoints keyed by chain, from `RPC_URL_<CHAIN>` variables.
    pub evm_urls: HashMap<Chain, String>,
    /// Tendermint RPC endpoint for the Noble leg.
    pub noble_rpc_url: String,
    /// Noble chain id (`noble-1` mainnet, `grand-1` testnet).
    pub noble_chain_id: String,
    /// Attestation service base URL; defaults per platform when unset.
    pub attestation_base_url: Option<String>,
    /// Permit-gated multicaller deployments, from `MULTICALLER_<CHAIN>`.
    pub multicaller: HashMap<Chain, Address>,
}

/// Signing material for the relayer accounts.
#[derive(Clone)]
pub struct SigningConfig {
    /// Hex private key of the EVM destination-caller account.
    pub relayer_private_key: String,
    /// BIP-39 mnemonic of the Noble destination-caller account.
    pub noble_mnemonic: String,
}

/// Custom Debug that redacts signing material to prevent log leakage.
impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("relayer_private_key", &"<redacted>")
            .field("noble_mnemonic", &"<redacted>")
            .finish()
    }
}

/// Relay pipeline tuning.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How often the scheduler sweeps the store, in milliseconds.
    pub sweep_interval_ms: u64,
    /// Backoff before a failed record becomes eligible for retry.
    pub retry_delay_ms: u64,
    /// Retry count after which stuck transfers are logged at warn level.
    pub retry_alert_threshold: u32,
}

fn default_sweep_interval() -> u64 {
    60_000
}

fn default_retry_delay() -> u64 {
    5 * 60_000
}

fn default_retry_alert_threshold() -> u32 {
    10
}

fn default_api_listen_addr() -> SocketAddr {
    ([0, 0, 0, 0], 8080).into()
}

impl Config {
    /// Load configuration, reading `.env` first when present.
    pub fn load() -> Result<Self> {
        if FsPath::new(".env").exists() {
            dotenvy::dotenv().map_err(|e| {
                PathwayError::InvalidConfig(format!("failed to load .env file: {e}"))
            })?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let platform = match env::var("PLATFORM").as_deref() {
            Ok("testnet") => Platform::Testnet,
            Ok("mainnet") | Err(_) => Platform::Mainnet,
            Ok(other) => {
                return Err(PathwayError::InvalidConfig(format!(
                    "PLATFORM must be mainnet or testnet, got {other}"
                )))
            }
        };

        let mut evm_urls = HashMap::new();
        let mut multicaller = HashMap::new();
        for chain in Chain::ALL {
            if chain.is_noble() {
                continue;
            }
            let upper = chain.to_string().to_ascii_uppercase();
            if let Ok(url) = env::var(format!("RPC_URL_{upper}")) {
                evm_urls.insert(chain, url);
            }
            if let Ok(address) = env::var(format!("MULTICALLER_{upper}")) {
                let parsed = address.parse().map_err(|_| {
                    PathwayError::InvalidConfig(format!(
                        "MULTICALLER_{upper} is not a valid address"
                    ))
                })?;
                multicaller.insert(chain, parsed);
            }
        }

        let rpc = RpcConfig {
            evm_urls,
            noble_rpc_url: required("NOBLE_RPC_URL")?,
            noble_chain_id: env::var("NOBLE_CHAIN_ID").unwrap_or_else(|_| {
                match platform {
                    Platform::Mainnet => "noble-1",
                    Platform::Testnet => "grand-1",
                }
                .to_string()
            }),
            attestation_base_url: env::var("ATTESTATION_BASE_URL").ok(),
            multicaller,
        };

        let signing = SigningConfig {
            relayer_private_key: required("RELAYER_PRIVATE_KEY")?,
            noble_mnemonic: required("NOBLE_MNEMONIC")?,
        };

        let relay = RelayConfig {
            sweep_interval_ms: optional_parsed("SWEEP_INTERVAL_MS", default_sweep_interval()),
            retry_delay_ms: optional_parsed("RETRY_DELAY_MS", default_retry_delay()),
            retry_alert_threshold: optional_parsed(
                "RETRY_ALERT_THRESHOLD",
                default_retry_alert_threshold(),
            ),
        };

        let api_listen_addr = match env::var("API_LISTEN_ADDR") {
            Ok(raw) => raw.parse().map_err(|_| {
                PathwayError::InvalidConfig(format!("API_LISTEN_ADDR is not a socket address: {raw}"))
            })?,
            Err(_) => default_api_listen_addr(),
        };

        let config = Config {
            platform,
            rpc,
            signing,
            relay,
            api_listen_addr,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rpc.noble_rpc_url.is_empty() {
            return Err(PathwayError::InvalidConfig(
                "NOBLE_RPC_URL cannot be empty".to_string(),
            ));
        }

        let key = &self.signing.relayer_private_key;
        if key.len() != 66 || !key.starts_with("0x") {
            return Err(PathwayError::InvalidConfig(
                "RELAYER_PRIVATE_KEY must be 66 chars (0x + 64 hex chars)".to_string(),
            ));
        }

        let words = self.signing.noble_mnemonic.split_whitespace().count();
        if words < 12 {
            return Err(PathwayError::InvalidConfig(
                "NOBLE_MNEMONIC must have at least 12 words".to_string(),
            ));
        }

        for chain in self.rpc.evm_urls.keys() {
            if chain.is_testnet() != self.platform.is_testnet() {
                return Err(PathwayError::InvalidConfig(format!(
                    "RPC endpoint configured for {chain} but platform is {:?}",
                    self.platform
                )));
            }
        }

        Ok(())
    }

    /// The attestation service base URL for this platform.
    pub fn attestation_base_url(&self) -> String {
        self.rpc.attestation_base_url.clone().unwrap_or_else(|| {
            match self.platform {
                Platform::Mainnet => "https://iris-api.circle.com",
                Platform::Testnet => "https://iris-api-sandbox.circle.com",
            }
            .to_string()
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| PathwayError::InvalidConfig(format!("{name} environment variable is required")))
}

fn optional_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            platform: Platform::Mainnet,
            rpc: RpcConfig {
                evm_urls: HashMap::from([(Chain::Base, "http://localhost:8545".to_string())]),
                noble_rpc_url: "http://localhost:26657".to_string(),
                noble_chain_id: "noble-1".to_string(),
                attestation_base_url: None,
                multicaller: HashMap::new(),
            },
            signing: SigningConfig {
                relayer_private_key:
                    "0x0000000000000000000000000000000000000000000000000000000000000001"
                        .to_string(),
                noble_mnemonic: "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about".to_string(),
            },
            relay: RelayConfig {
                sweep_interval_ms: default_sweep_interval(),
                retry_delay_ms: default_retry_delay(),
                retry_alert_threshold: default_retry_alert_threshold(),
            },
            api_listen_addr: default_api_listen_addr(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn short_private_key_is_rejected() {
        let mut config = sample_config();
        config.signing.relayer_private_key = "0x123".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_mnemonic_is_rejected() {
        let mut config = sample_config();
        config.signing.noble_mnemonic = "abandon abandon about".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn platform_mismatched_rpc_is_rejected() {
        let mut config = sample_config();
        config
            .rpc
            .evm_urls
            .insert(Chain::Sepolia, "http://localhost:8545".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn signing_debug_is_redacted() {
        let out = format!("{:?}", sample_config().signing);
        assert!(out.contains("<redacted>"));
        assert!(!out.contains("abandon"));
    }

    #[test]
    fn attestation_url_defaults_per_platform() {
        let mut config = sample_config();
        assert_eq!(config.attestation_base_url(), "https://iris-api.circle.com");
        config.platform = Platform::Testnet;
        assert_eq!(
            config.attestation_base_url(),
            "https://iris-api-sandbox.circle.com"
        );
        config.rpc.attestation_base_url = Some("http://localhost:9999".to_string());
        assert_eq!(config.attestation_base_url(), "http://localhost:9999");
    }
}
