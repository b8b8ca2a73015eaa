//! CCTP v1 wire protocol: cross-chain address codec, burn message format,
//! deposit receipt parsing, and the attestation service client.

pub mod address;
pub mod attestation;
pub mod message;
pub mod receipt;

pub use address::*;
pub use attestation::{AttestationClient, AttestationResponse, AttestationStatus};
pub use message::{BurnMessage, BurnMessageBody, MessageHeader};
pub use receipt::DepositEvents;
