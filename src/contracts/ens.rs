//! Minimal ENS bindings for forward name resolution.

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// The ENS registry, deployed at the same address on Ethereum mainnet and
/// the major testnets.
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }
);
