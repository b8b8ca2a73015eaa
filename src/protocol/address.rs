//! Cross-chain address codec.
//!
//! CCTP messages carry every account as a left-padded 32-byte value. This
//! module converts between that canonical form and the two textual address
//! families the engine supports: 0x-hex EVM addresses and bech32 Noble
//! accounts. ENS names are detected here and resolved by the fee/quote layer,
//! which owns an Ethereum provider.

use alloy_primitives::{keccak256, Address, FixedBytes};
use bech32::{FromBase32, ToBase32, Variant};

use crate::chain::Chain;
use crate::error::{PathwayError, Result};

/// Left-pad a 20-byte EVM address (or any shorter payload) to 32 bytes.
pub fn bytes32_from_hex(address: &str) -> Result<FixedBytes<32>> {
    let raw = address
        .strip_prefix("0x")
        .ok_or_else(|| PathwayError::InvalidAddress {
            reason: format!("expected 0x-prefixed hex address, got {address}"),
        })?;
    let bytes = alloy_primitives::hex::decode(raw)?;
    if bytes.len() > 32 {
        return Err(PathwayError::InvalidAddress {
            reason: format!("hex address too long: {} bytes", bytes.len()),
        });
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(FixedBytes::from(out))
}

/// Decode a bech32 account into its left-padded 32-byte form.
pub fn bytes32_from_bech32(address: &str) -> Result<FixedBytes<32>> {
    let (_hrp, data, _variant) = bech32::decode(address)?;
    let bytes = Vec::<u8>::from_base32(&data)?;
    if bytes.len() > 32 {
        return Err(PathwayError::InvalidAddress {
            reason: format!("bech32 payload too long: {} bytes", bytes.len()),
        });
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(FixedBytes::from(out))
}

/// The low 20 bytes of a canonical value, as an EVM address.
pub fn address_from_bytes32(bytes: &FixedBytes<32>) -> Address {
    Address::from_slice(&bytes[12..])
}

/// Re-encode a canonical value as a bech32 account, dropping the zero
/// padding. An all-zero value encodes the empty payload.
pub fn bech32_from_bytes32(bytes: &FixedBytes<32>, hrp: &str) -> Result<String> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    Ok(bech32::encode(
        hrp,
        (&bytes[start..]).to_base32(),
        Variant::Bech32,
    )?)
}

/// Parse a textual address in `chain`'s native family into canonical form.
pub fn bytes32_for_chain(chain: Chain, address: &str) -> Result<FixedBytes<32>> {
    if chain.is_noble() {
        bytes32_from_bech32(address)
    } else {
        bytes32_from_hex(address)
    }
}

/// Whether the string looks like an ENS name rather than an address.
pub fn is_ens_name(address: &str) -> bool {
    address.ends_with(".eth")
}

/// EIP-137 namehash, used for forward ENS resolution.
pub fn namehash(name: &str) -> FixedBytes<32> {
    let mut node = FixedBytes::<32>::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_ascii_lowercase().as_bytes());
        let mut packed = [0u8; 64];
        packed[..32].copy_from_slice(node.as_slice());
        packed[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(packed);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn hex_address_is_left_padded() {
        let packed = bytes32_from_hex("0xeB4EaE8072bF3e2608f05B6812CD95133BF71504").unwrap();
        assert_eq!(&packed[..12], &[0u8; 12]);
        assert_eq!(
            address_from_bytes32(&packed),
            address!("eB4EaE8072bF3e2608f05B6812CD95133BF71504")
        );
    }

    #[test]
    fn hex_without_prefix_is_rejected() {
        assert!(bytes32_from_hex("eB4EaE8072bF3e2608f05B6812CD95133BF71504").is_err());
    }

    #[test]
    fn bech32_round_trips_through_canonical_form() {
        let noble = "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek";
        let packed = bytes32_from_bech32(noble).unwrap();
        assert_eq!(&packed[..12], &[0u8; 12]);
        let back = bech32_from_bytes32(&packed, "noble").unwrap();
        assert_eq!(back, noble);
    }

    #[test]
    fn chain_dispatch_picks_the_right_family() {
        assert!(bytes32_for_chain(Chain::Noble, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek")
            .is_ok());
        assert!(bytes32_for_chain(Chain::Ethereum, "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek")
            .is_err());
        assert!(
            bytes32_for_chain(Chain::Base, "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504").is_ok()
        );
    }

    #[test]
    fn ens_names_are_detected_not_parsed() {
        assert!(is_ens_name("vitalik.eth"));
        assert!(!is_ens_name("0xeB4EaE8072bF3e2608f05B6812CD95133BF71504"));
        assert!(!is_ens_name("noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek"));
    }

    #[test]
    fn namehash_matches_eip137_vectors() {
        assert_eq!(namehash(""), FixedBytes::<32>::ZERO);
        assert_eq!(
            namehash("eth").to_string(),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            namehash("foo.eth").to_string(),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }
}
