use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathwayError {
    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Could not resolve receiver: {reason}")]
    ReceiverResolution { reason: String },

    #[error("Could not estimate gas: {reason}")]
    GasEstimation { reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Attestation not ready (will retry)")]
    AttestationNotReady,

    #[error("Attestation service rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Timed out waiting for transaction receipt: {tx_hash}")]
    ReceiptTimeout { tx_hash: String },

    #[error("Malformed CCTP message: {reason}")]
    MessageCodec { reason: String },

    #[error("Record already exists for key {key}")]
    DuplicateRecord { key: String },

    #[error("No record found for key {key}")]
    RecordNotFound { key: String },

    #[error("Message store error: {0}")]
    Store(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Cosmos tx error: {0}")]
    Cosmos(String),

    #[error("Tendermint RPC error: {0}")]
    TendermintRpc(#[from] tendermint_rpc::Error),

    #[error("Protobuf decoding error: {0}")]
    Proto(#[from] prost::DecodeError),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Contract call failed: {0}")]
    ContractCall(#[from] alloy_contract::Error),

    #[error("Signer error: {0}")]
    Signer(#[from] alloy_signer::Error),

    #[error("Bech32 error: {0}")]
    Bech32(#[from] bech32::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, PathwayError>;
