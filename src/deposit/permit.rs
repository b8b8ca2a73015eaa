//! EIP-2612 permit construction for sponsored burns.
//!
//! The user signs a USDC permit for the multicaller contract instead of
//! sending an approval transaction. The permit deadline doubles as an
//! authorization channel: the real deadline sits in the high bits and the
//! low 160 bits name the relayer allowed to execute the call.

use alloy_primitives::{Address, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, Eip712Domain, SolStruct};

use crate::error::Result;

sol! {
    /// EIP-2612 permit payload.
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }
}

/// Token metadata needed to build the EIP-712 domain, read from the USDC
/// contract on the source chain.
#[derive(Debug, Clone)]
pub struct PermitDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub contract: Address,
}

impl PermitDomain {
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.contract),
            None,
        )
    }
}

/// A signed permit ready for `executeCallWithPermit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
    /// The packed deadline the permit was signed over.
    pub deadline: U256,
}

/// Pack an expiry timestamp and the authorized relayer into one word.
pub fn pack_deadline(deadline_secs: u64, relayer: Address) -> U256 {
    (U256::from(deadline_secs) << 160) | U256::from_be_slice(relayer.as_slice())
}

/// Build the permit message granting `spender` a pull of `value` USDC.
pub fn permit_message(
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    packed_deadline: U256,
) -> Permit {
    Permit {
        owner,
        spender,
        value,
        nonce,
        deadline: packed_deadline,
    }
}

/// Sign a permit with a local key, returning the split signature.
pub fn sign_permit(
    signer: &PrivateKeySigner,
    permit: &Permit,
    domain: &PermitDomain,
) -> Result<PermitSignature> {
    let hash = permit.eip712_signing_hash(&domain.eip712());
    let signature = signer.sign_hash_sync(&hash)?;
    let bytes = signature.as_bytes();
    Ok(PermitSignature {
        v: bytes[64],
        r: B256::from_slice(&bytes[..32]),
        s: B256::from_slice(&bytes[32..64]),
        deadline: permit.deadline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const RELAYER: Address = address!("eB4EaE8072bF3e2608f05B6812CD95133BF71504");

    #[test]
    fn packed_deadline_splits_back_out() {
        let packed = pack_deadline(1_700_000_000, RELAYER);
        assert_eq!(packed >> 160, U256::from(1_700_000_000u64));
        let low: U256 = packed & ((U256::from(1u8) << 160) - U256::from(1u8));
        assert_eq!(Address::from_slice(&low.to_be_bytes::<32>()[12..]), RELAYER);
    }

    #[test]
    fn signature_recovers_to_signer() {
        let signer = PrivateKeySigner::from_bytes(&B256::from(U256::from(7u8))).unwrap();
        let domain = PermitDomain {
            name: "USD Coin".to_string(),
            version: "2".to_string(),
            chain_id: 8453,
            contract: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        };
        let permit = permit_message(
            signer.address(),
            address!("D54c1628F113dA05bE5048dF948bc8dade604911"),
            U256::from(25_000_000u64),
            U256::ZERO,
            pack_deadline(1_700_000_000, RELAYER),
        );

        let sig = sign_permit(&signer, &permit, &domain).unwrap();
        assert!(sig.v == 27 || sig.v == 28);
        assert_eq!(sig.deadline, permit.deadline);

        let hash = permit.eip712_signing_hash(&domain.eip712());
        let recovered = alloy_primitives::Signature::from_scalars_and_parity(
            sig.r,
            sig.s,
            sig.v == 28,
        )
        .recover_address_from_prehash(&hash)
        .unwrap();
        assert_eq!(recovered, signer.address());
    }
}
