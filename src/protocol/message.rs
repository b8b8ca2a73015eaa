//! CCTP v1 message format types
//!
//! A transfer travels as a general message envelope whose body is a token
//! burn record. Both layers use packed big-endian encoding.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use alloy_primitives::{keccak256, Bytes, FixedBytes, U256};

/// CCTP v1 Message Header
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - sourceDomain: uint32 (4 bytes)
/// - destinationDomain: uint32 (4 bytes)
/// - nonce: uint64 (8 bytes) - unique per source domain
/// - sender: bytes32 (32 bytes) - sending TokenMessenger
/// - recipient: bytes32 (32 bytes) - receiving TokenMessenger
/// - destinationCaller: bytes32 (32 bytes) - authorized caller (0 = anyone)
///
/// Total fixed size: 4 + 4 + 4 + 8 + 32 + 32 + 32 = 116 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: u32,
    pub destination_domain: u32,
    pub nonce: u64,
    pub sender: FixedBytes<32>,
    pub recipient: FixedBytes<32>,
    pub destination_caller: FixedBytes<32>,
}

impl MessageHeader {
    /// Size of the message header in bytes
    pub const SIZE: usize = 116;

    pub fn encode_into(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.to_be_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
    }

    /// Decodes a message header from bytes.
    ///
    /// Returns `None` if the slice is shorter than [`MessageHeader::SIZE`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        let version = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let source_domain = u32::from_be_bytes(bytes[4..8].try_into().ok()?);
        let destination_domain = u32::from_be_bytes(bytes[8..12].try_into().ok()?);
        let nonce = u64::from_be_bytes(bytes[12..20].try_into().ok()?);
        let sender = FixedBytes::from_slice(&bytes[20..52]);
        let recipient = FixedBytes::from_slice(&bytes[52..84]);
        let destination_caller = FixedBytes::from_slice(&bytes[84..116]);

        Some(Self {
            version,
            source_domain,
            destination_domain,
            nonce,
            sender,
            recipient,
            destination_caller,
        })
    }
}

/// CCTP v1 Burn Message Body
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - burnToken: bytes32 (32 bytes) - token burned on the source chain
/// - mintRecipient: bytes32 (32 bytes) - account minted to on destination
/// - amount: uint256 (32 bytes)
/// - messageSender: bytes32 (32 bytes) - account that initiated the burn
///
/// Total fixed size: 4 + 32 + 32 + 32 + 32 = 132 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnMessageBody {
    pub version: u32,
    pub burn_token: FixedBytes<32>,
    pub mint_recipient: FixedBytes<32>,
    pub amount: U256,
    pub message_sender: FixedBytes<32>,
}

impl BurnMessageBody {
    /// Size of the burn body in bytes
    pub const SIZE: usize = 132;

    pub fn encode_into(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(self.burn_token.as_slice());
        bytes.extend_from_slice(self.mint_recipient.as_slice());
        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        bytes.extend_from_slice(self.message_sender.as_slice());
    }

    /// Decodes a burn body from bytes.
    ///
    /// Returns `None` if the slice is shorter than [`BurnMessageBody::SIZE`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        let version = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let burn_token = FixedBytes::from_slice(&bytes[4..36]);
        let mint_recipient = FixedBytes::from_slice(&bytes[36..68]);
        let amount = U256::from_be_slice(&bytes[68..100]);
        let message_sender = FixedBytes::from_slice(&bytes[100..132]);

        Some(Self {
            version,
            burn_token,
            mint_recipient,
            amount,
            message_sender,
        })
    }
}

/// A complete burn transfer message: header plus burn body.
///
/// This is the exact byte string the `MessageSent` event carries, the
/// attestation service signs over, and `receiveMessage` consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnMessage {
    pub header: MessageHeader,
    pub body: BurnMessageBody,
}

impl BurnMessage {
    /// Total size of an encoded burn message in bytes
    pub const SIZE: usize = MessageHeader::SIZE + BurnMessageBody::SIZE;

    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        self.header.encode_into(&mut bytes);
        self.body.encode_into(&mut bytes);
        Bytes::from(bytes)
    }

    /// Decodes a full burn message.
    ///
    /// Returns `None` if the slice is shorter than [`BurnMessage::SIZE`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let header = MessageHeader::decode(bytes)?;
        let body = BurnMessageBody::decode(&bytes[MessageHeader::SIZE..])?;
        Some(Self { header, body })
    }

    /// keccak-256 over the encoded message, the attestation lookup key.
    pub fn message_hash(&self) -> FixedBytes<32> {
        keccak256(self.encode())
    }
}
