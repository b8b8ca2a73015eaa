//! Noble chain client: account queries, gas simulation, and signed
//! transaction broadcast over Tendermint RPC.
//!
//! Noble's CCTP module has no published Rust types, so the two messages the
//! engine submits are declared here as prost structs with their canonical
//! type URLs.

use std::str::FromStr;
use std::time::Duration;

use bip39::Mnemonic;
use cosmrs::{
    bip32::DerivationPath,
    crypto::secp256k1::SigningKey,
    proto::cosmos::auth::v1beta1::{BaseAccount, QueryAccountRequest, QueryAccountResponse},
    proto::cosmos::tx::v1beta1::{SimulateRequest, SimulateResponse, TxRaw},
    tx::{self, Fee, SignDoc, SignerInfo},
    AccountId, Any, Coin,
};
use prost::Message;
use tendermint_rpc::{Client, HttpClient};
use tracing::{debug, info};

use crate::error::{PathwayError, Result};

/// Cosmos derivation path used by Noble accounts.
const NOBLE_DERIVATION_PATH: &str = "m/44'/118'/0'/0/0";

const ACCOUNT_QUERY_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";
const SIMULATE_QUERY_PATH: &str = "/cosmos.tx.v1beta1.Service/Simulate";

/// `circle.cctp.v1.MsgDepositForBurnWithCaller`
#[derive(Clone, PartialEq, Message)]
pub struct MsgDepositForBurnWithCaller {
    #[prost(string, tag = "1")]
    pub from: String,
    /// Amount in uusdc, as the module expects it: a decimal string.
    #[prost(string, tag = "2")]
    pub amount: String,
    #[prost(uint32, tag = "3")]
    pub destination_domain: u32,
    #[prost(bytes = "vec", tag = "4")]
    pub mint_recipient: Vec<u8>,
    #[prost(string, tag = "5")]
    pub burn_token: String,
    #[prost(bytes = "vec", tag = "6")]
    pub destination_caller: Vec<u8>,
}

impl MsgDepositForBurnWithCaller {
    pub const TYPE_URL: &'static str = "/circle.cctp.v1.MsgDepositForBurnWithCaller";

    pub fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }
}

/// `circle.cctp.v1.MsgReceiveMessage`
#[derive(Clone, PartialEq, Message)]
pub struct MsgReceiveMessage {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(bytes = "vec", tag = "2")]
    pub message: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub attestation: Vec<u8>,
}

impl MsgReceiveMessage {
    pub const TYPE_URL: &'static str = "/circle.cctp.v1.MsgReceiveMessage";

    pub fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }
}

/// Account number and sequence for signing.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

/// Noble client over Tendermint RPC, optionally holding a signing key.
pub struct NobleClient {
    rpc: HttpClient,
    chain_id: tendermint::chain::Id,
    signing_key: Option<SigningKey>,
    address: Option<AccountId>,
}

impl NobleClient {
    /// Read-only client.
    pub fn new(rpc_url: &str, chain_id: &str) -> Result<Self> {
        let rpc = HttpClient::new(rpc_url)?;
        let chain_id = chain_id
            .parse()
            .map_err(|_| PathwayError::InvalidConfig(format!("invalid chain id {chain_id}")))?;
        Ok(Self {
            rpc,
            chain_id,
            signing_key: None,
            address: None,
        })
    }

    /// Client with a signer derived from a BIP-39 mnemonic at the Cosmos
    /// derivation path, bech32-encoded with the `noble` prefix.
    pub fn with_signer(rpc_url: &str, chain_id: &str, mnemonic: &str) -> Result<Self> {
        let mut client = Self::new(rpc_url, chain_id)?;

        let mnemonic = Mnemonic::parse(mnemonic)
            .map_err(|e| PathwayError::InvalidConfig(format!("invalid mnemonic: {e}")))?;
        let seed = mnemonic.to_seed("");
        let path: DerivationPath = NOBLE_DERIVATION_PATH
            .parse()
            .map_err(|e| PathwayError::Cosmos(format!("invalid derivation path: {e:?}")))?;
        let signing_key = SigningKey::derive_from_path(seed, &path)
            .map_err(|e| PathwayError::Cosmos(format!("failed to derive signing key: {e}")))?;
        let address = signing_key
            .public_key()
            .account_id("noble")
            .map_err(|e| PathwayError::Cosmos(format!("failed to derive account id: {e}")))?;

        info!(address = %address, "Noble signer initialized");
        client.signing_key = Some(signing_key);
        client.address = Some(address);
        Ok(client)
    }

    /// The signer's account, if one was configured.
    pub fn address(&self) -> Result<&AccountId> {
        self.address
            .as_ref()
            .ok_or_else(|| PathwayError::InvalidConfig("Noble client has no signer".to_string()))
    }

    /// Query account number and sequence for signing.
    pub async fn account_info(&self, address: &AccountId) -> Result<AccountInfo> {
        let request = QueryAccountRequest {
            address: address.to_string(),
        };
        let response = self
            .rpc
            .abci_query(
                Some(ACCOUNT_QUERY_PATH.to_string()),
                request.encode_to_vec(),
                None,
                false,
            )
            .await?;
        if response.code.is_err() {
            return Err(PathwayError::Cosmos(format!(
                "account query failed: {}",
                response.log
            )));
        }

        let decoded = QueryAccountResponse::decode(response.value.as_slice())?;
        let any = decoded
            .account
            .ok_or_else(|| PathwayError::Cosmos(format!("account {address} not found")))?;
        let base = BaseAccount::decode(any.value.as_slice())?;
        Ok(AccountInfo {
            account_number: base.account_number,
            sequence: base.sequence,
        })
    }

    /// Simulate a set of messages and return the gas they consume.
    ///
    /// The simulated transaction carries the signer's public key with an
    /// empty signature, which the simulate endpoint accepts.
    pub async fn simulate(&self, signer: &AccountId, msgs: Vec<Any>) -> Result<u64> {
        let info = self.account_info(signer).await?;
        let key = self.signing_key()?;

        let body = tx::Body::new(msgs, "", 0u32);
        let signer_info = SignerInfo::single_direct(Some(key.public_key()), info.sequence);
        let auth_info = signer_info.auth_info(Fee::from_amount_and_gas(
            Coin {
                denom: self.usdc_denom(),
                amount: 0,
            },
            0u64,
        ));

        let tx_raw = TxRaw {
            body_bytes: body
                .into_bytes()
                .map_err(|e| PathwayError::Cosmos(format!("failed to encode tx body: {e}")))?,
            auth_info_bytes: auth_info
                .into_bytes()
                .map_err(|e| PathwayError::Cosmos(format!("failed to encode auth info: {e}")))?,
            signatures: vec![Vec::new()],
        };

        #[allow(deprecated)]
        let request = SimulateRequest {
            tx: None,
            tx_bytes: tx_raw.encode_to_vec(),
        };
        let response = self
            .rpc
            .abci_query(
                Some(SIMULATE_QUERY_PATH.to_string()),
                request.encode_to_vec(),
                None,
                false,
            )
            .await?;
        if response.code.is_err() {
            return Err(PathwayError::Cosmos(format!(
                "simulation failed: {}",
                response.log
            )));
        }

        let simulated = SimulateResponse::decode(response.value.as_slice())?;
        let gas_used = simulated
            .gas_info
            .map(|info| info.gas_used)
            .ok_or_else(|| PathwayError::Cosmos("simulate returned no gas info".to_string()))?;
        debug!(gas_used, "Noble simulation complete");
        Ok(gas_used)
    }

    /// Sign and broadcast, returning the transaction hash.
    pub async fn sign_and_broadcast(
        &self,
        msgs: Vec<Any>,
        fee: Fee,
        memo: &str,
    ) -> Result<String> {
        let key = self.signing_key()?;
        let address = self.address()?.clone();
        let info = self.account_info(&address).await?;

        let body = tx::Body::new(msgs, memo, 0u32);
        let signer_info = SignerInfo::single_direct(Some(key.public_key()), info.sequence);
        let auth_info = signer_info.auth_info(fee);
        let sign_doc = SignDoc::new(&body, &auth_info, &self.chain_id, info.account_number)
            .map_err(|e| PathwayError::Cosmos(format!("failed to create sign doc: {e}")))?;
        let tx_bytes = sign_doc
            .sign(key)
            .and_then(|raw| raw.to_bytes())
            .map_err(|e| PathwayError::Cosmos(format!("failed to sign transaction: {e}")))?;

        let response = self.rpc.broadcast_tx_sync(tx_bytes).await?;
        if response.code.is_err() {
            return Err(PathwayError::TransactionFailed {
                reason: format!("broadcast rejected (code {:?}): {}", response.code, response.log),
            });
        }

        let hash = response.hash.to_string();
        info!(tx_hash = %hash, "Noble transaction broadcast");
        Ok(hash)
    }

    /// Fetch the ABCI events of a committed transaction, polling until the
    /// node has indexed it or `timeout` elapses.
    pub async fn tx_events(
        &self,
        hash: &str,
        timeout: Duration,
    ) -> Result<Vec<tendermint::abci::Event>> {
        let parsed = tendermint::Hash::from_str(hash.trim_start_matches("0x"))
            .map_err(|e| PathwayError::Cosmos(format!("invalid tx hash {hash}: {e}")))?;

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.rpc.tx(parsed, false).await {
                Ok(response) => {
                    if response.tx_result.code.is_err() {
                        return Err(PathwayError::TransactionFailed {
                            reason: format!(
                                "transaction {hash} failed: {}",
                                response.tx_result.log
                            ),
                        });
                    }
                    return Ok(response.tx_result.events);
                }
                Err(e) if tokio::time::Instant::now() >= deadline => {
                    return Err(PathwayError::ReceiptTimeout {
                        tx_hash: format!("{hash}: {e}"),
                    });
                }
                Err(_) => tokio::time::sleep(Duration::from_secs(2)).await,
            }
        }
    }

    /// `uusdc` as a parsed denom.
    pub fn usdc_denom(&self) -> cosmrs::Denom {
        // The literal is static and always parses.
        "uusdc".parse().unwrap_or_else(|_| unreachable!())
    }

    fn signing_key(&self) -> Result<&SigningKey> {
        self.signing_key
            .as_ref()
            .ok_or_else(|| PathwayError::InvalidConfig("Noble client has no signer".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_path_is_valid() {
        let path: std::result::Result<DerivationPath, _> = NOBLE_DERIVATION_PATH.parse();
        assert!(path.is_ok());
    }

    #[test]
    fn deposit_msg_encodes_with_canonical_type_url() {
        let msg = MsgDepositForBurnWithCaller {
            from: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
            amount: "24840000".to_string(),
            destination_domain: 6,
            mint_recipient: vec![0u8; 32],
            burn_token: "uusdc".to_string(),
            destination_caller: vec![0u8; 32],
        };
        let any = msg.to_any();
        assert_eq!(any.type_url, "/circle.cctp.v1.MsgDepositForBurnWithCaller");

        let decoded = MsgDepositForBurnWithCaller::decode(any.value.as_slice()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn receive_msg_round_trips() {
        let msg = MsgReceiveMessage {
            from: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
            message: vec![1, 2, 3],
            attestation: vec![4, 5, 6],
        };
        let decoded = MsgReceiveMessage::decode(msg.to_any().value.as_slice()).unwrap();
        assert_eq!(decoded, msg);
    }
}
