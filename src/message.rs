//! Transfer records and the status state machine.
//!
//! A [`ReceiveMessage`] is the unit of work the relay pipeline moves through
//! its stages. Records serialize with `U256`/`u64` money and height fields as
//! decimal strings so stores and queues never lose precision to JSON number
//! parsing.

use alloy_primitives::{Bytes, FixedBytes, U256};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::Chain;
use crate::path::Path;

/// Opaque idempotency key for a transfer, normalized to lowercase.
///
/// In practice this is the deposit transaction hash on the source chain;
/// callers that still hold the legacy partition-key spelling get the same
/// value after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageKey(String);

impl MessageKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<alloy_primitives::TxHash> for MessageKey {
    fn from(hash: alloy_primitives::TxHash) -> Self {
        Self::new(hash.to_string())
    }
}

/// Lifecycle of a transfer.
///
/// ```text
/// waiting -> pending -> attested -> received
///     \         \          \
///      +---------+----------+--> failed (retried later)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Burn submitted, waiting out the source-chain confirmation window.
    Waiting,
    /// Confirmation window elapsed, polling for the attestation.
    Pending,
    /// Attestation in hand, mint not yet submitted.
    Attested,
    /// Mint confirmed on the destination chain. Terminal.
    Received,
    /// A stage failed; the retry stage will pick the record up again.
    Failed,
}

impl Status {
    /// Whether moving to `next` is a legal step of the lifecycle.
    ///
    /// `Failed` is reachable from any non-terminal state, and a retry moves a
    /// failed record back to `Pending`.
    pub fn can_transition_to(&self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Waiting, Status::Pending)
                | (Status::Pending, Status::Attested)
                | (Status::Attested, Status::Received)
                | (Status::Waiting, Status::Failed)
                | (Status::Pending, Status::Failed)
                | (Status::Attested, Status::Failed)
                | (Status::Failed, Status::Pending)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Received)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Waiting => "waiting",
            Status::Pending => "pending",
            Status::Attested => "attested",
            Status::Received => "received",
            Status::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One follow-up action recorded with a submission, replayed by the relay
/// executor. Contract calls carry ABI-encoded calldata; api calls carry an
/// opaque payload for an external submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub order: u32,
    #[serde(rename = "type")]
    pub kind: CallKind,
    pub data: String,
    pub chain: Chain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Contract,
    Api,
}

/// A fee or gas amount with its token precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmount {
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    pub decimals: u8,
}

impl FeeAmount {
    /// USDC precision, which every fee in this crate is quoted in.
    pub const USDC_DECIMALS: u8 = 6;

    pub fn usdc(amount: U256) -> Self {
        Self {
            amount,
            decimals: Self::USDC_DECIMALS,
        }
    }
}

/// Cost and timing estimate for a path, both legs priced in USDC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(with = "u64_decimal")]
    pub estimated_time_in_milliseconds: u64,
    #[serde(with = "u256_decimal")]
    pub estimated_output_amount: U256,
    pub estimated_fee: QuoteFee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFee {
    /// Gas for the source-chain deposit, in USDC.
    pub execution_cost: FeeAmount,
    /// Attested mint on the destination plus the protocol routing fee.
    pub routing_fee: FeeAmount,
}

/// The durable record of one transfer, as stored and queued by the relay
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct ReceiveMessage {
    /// Idempotency key; the deposit transaction hash.
    pub key: MessageKey,
    pub status: Status,
    /// Burn nonce, zero until the deposit receipt has been parsed.
    #[serde(with = "u64_decimal")]
    #[builder(default)]
    pub nonce: u64,
    /// Raw message bytes from the `MessageSent` event, empty until parsed.
    #[builder(default)]
    pub message_bytes: Bytes,
    /// keccak-256 of `message_bytes`, zero until parsed.
    #[builder(default)]
    pub message_hash: FixedBytes<32>,
    /// Destination block height observed when the deposit was made.
    #[serde(with = "u64_decimal")]
    #[builder(default)]
    pub destination_block_height_at_deposit: u64,
    /// Source-chain confirmation window, in milliseconds.
    #[serde(with = "u64_decimal")]
    pub block_confirmation_in_ms: u64,
    pub original_path: Path,
    /// Signed attestation, present once the poller has fetched it.
    pub circle_attestation: Option<Bytes>,
    /// Mint transaction hash on the destination chain.
    pub receive_hash: Option<String>,
    /// Follow-up calls recorded at submission time.
    #[builder(default)]
    pub calls: Vec<Call>,
    pub submitted_at: DateTime<Utc>,
    /// Earliest time the retry stage may touch a failed record.
    pub retry_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub retry_count: u32,
}

impl ReceiveMessage {
    /// Apply a status change, enforcing the lifecycle.
    pub fn transition(&mut self, next: Status) -> crate::error::Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(crate::error::PathwayError::InvalidPath {
                reason: format!("illegal status transition {} -> {}", self.status, next),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Serialize `U256` as a decimal string.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Serialize `u64` as a decimal string.
pub mod u64_decimal {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn message_key_normalizes_case_and_whitespace() {
        let key = MessageKey::new(" 0xABCDef01 ");
        assert_eq!(key.as_str(), "0xabcdef01");
        assert_eq!(key, MessageKey::new("0xabcdef01"));
    }

    #[rstest]
    #[case(Status::Waiting, Status::Pending, true)]
    #[case(Status::Pending, Status::Attested, true)]
    #[case(Status::Attested, Status::Received, true)]
    #[case(Status::Pending, Status::Failed, true)]
    #[case(Status::Failed, Status::Pending, true)]
    #[case(Status::Waiting, Status::Attested, false)]
    #[case(Status::Received, Status::Failed, false)]
    #[case(Status::Received, Status::Pending, false)]
    #[case(Status::Pending, Status::Waiting, false)]
    fn status_transitions(#[case] from: Status, #[case] to: Status, #[case] legal: bool) {
        assert_eq!(from.can_transition_to(to), legal);
    }

    #[test]
    fn amounts_serialize_as_decimal_strings() {
        let fee = FeeAmount::usdc(U256::from(1_310_000u64));
        let json = serde_json::to_value(&fee).unwrap();
        assert_eq!(json["amount"], "1310000");
        assert_eq!(json["decimals"], 6);

        let back: FeeAmount = serde_json::from_value(json).unwrap();
        assert_eq!(back, fee);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Status::Received).unwrap(), "\"received\"");
        let parsed: Status = serde_json::from_str("\"attested\"").unwrap();
        assert_eq!(parsed, Status::Attested);
    }

    #[test]
    fn transition_rejects_illegal_steps() {
        let mut record = sample_record();
        record.transition(Status::Pending).unwrap();
        record.transition(Status::Attested).unwrap();
        assert!(record.transition(Status::Waiting).is_err());
        record.transition(Status::Received).unwrap();
        assert!(record.transition(Status::Failed).is_err());
    }

    fn sample_record() -> ReceiveMessage {
        ReceiveMessage::builder()
            .key(MessageKey::new("0xdeadbeef"))
            .status(Status::Waiting)
            .block_confirmation_in_ms(780_000)
            .original_path(crate::path::Path {
                from_chain: Chain::Base,
                to_chain: Chain::Noble,
                sender_address: "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504".to_string(),
                receiver_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
                amount: U256::from(25_000_000u64),
                fee: U256::from(500_000u64),
            })
            .submitted_at(Utc::now())
            .build()
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ReceiveMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
