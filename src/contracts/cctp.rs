//! TokenMessenger and MessageTransmitter contract bindings
//!
//! Reference: <https://developers.circle.com/stablecoins/evm-smart-contracts>

use alloy_sol_types::sol;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ITokenMessenger {
        event DepositForBurn(
            uint64 indexed nonce,
            address indexed burnToken,
            uint256 amount,
            address indexed depositor,
            bytes32 mintRecipient,
            uint32 destinationDomain,
            bytes32 destinationTokenMessenger,
            bytes32 destinationCaller
        );

        function depositForBurnWithCaller(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller
        ) external returns (uint64 nonce);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMessageTransmitter {
        event MessageSent(bytes message);

        event MessageReceived(
            address indexed caller,
            uint32 sourceDomain,
            uint64 indexed nonce,
            bytes32 sender,
            bytes messageBody
        );

        function receiveMessage(
            bytes calldata message,
            bytes calldata attestation
        ) external returns (bool success);

        function usedNonces(bytes32 nonceHash) external view returns (uint256);
    }
);
