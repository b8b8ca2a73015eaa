//! Bindings for the permit-gated multicaller that sponsors burn submission.
//!
//! The contract pulls USDC from the user via an EIP-2612 permit and forwards
//! the encoded `depositForBurnWithCaller` call, so the relayer account pays
//! gas instead of the user. The permit deadline packs the real deadline in
//! the high bits and the authorized relayer in the low 160 bits.

use alloy_sol_types::sol;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IMulticallerWithPermit {
        struct PermitCall {
            address user;
            uint256 amount;
            bytes message;
            uint256 deadline;
            uint8 v;
            bytes32 r;
            bytes32 s;
        }

        function executeCallWithPermit(PermitCall calldata call) external;
    }
);
